//! PostgreSQL implementation of [`BridgeStore`].

use crate::models::{
    AccountLinkRow, GuildSettingsRow, LinkRow, LinkTokenRow, PermissionRow, SinkRow,
};
use crate::schema::{guild_settings, link_tokens, mc_links, mc_perm_cache, mc_webhooks, user_links};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use kavex_core::{
    AccountLink, ChannelId, DeliverySink, GuildId, Link, LinkStatus, LinkToken, PermissionProfile,
    UserId,
};
use kavex_error::StoreError;
use kavex_interface::{BridgeStore, RedeemOutcome, StoreResult};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;

/// PostgreSQL-backed bridge store.
///
/// Every method locks the shared connection for its whole duration, so
/// multi-statement operations run inside a transaction on one connection.
#[derive(Clone)]
pub struct PostgresBridgeStore {
    conn: Arc<Mutex<PgConnection>>,
}

impl PostgresBridgeStore {
    /// Create a store owning `conn`.
    pub fn new(conn: PgConnection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Create a store from a shared connection.
    pub fn from_arc(conn: Arc<Mutex<PgConnection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl BridgeStore for PostgresBridgeStore {
    // ========================================================================
    // Links
    // ========================================================================

    #[instrument(skip(self, link), fields(guild_id = %link.guild_id, channel_id = %link.channel_id))]
    async fn upsert_link(&self, link: &Link) -> StoreResult<()> {
        let mut conn = self.conn.lock().await;
        let row = LinkRow::from(link);

        diesel::insert_into(mc_links::table)
            .values(&row)
            .on_conflict((mc_links::guild_id, mc_links::channel_id))
            .do_update()
            .set(&row)
            .execute(&mut *conn)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_link(&self, guild_id: GuildId, channel_id: ChannelId) -> StoreResult<bool> {
        let mut conn = self.conn.lock().await;
        let (g, c) = (guild_id.to_db(), channel_id.to_db());

        let removed = conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            diesel::delete(
                mc_webhooks::table
                    .filter(mc_webhooks::guild_id.eq(g))
                    .filter(mc_webhooks::channel_id.eq(c)),
            )
            .execute(conn)?;
            diesel::delete(
                mc_links::table
                    .filter(mc_links::guild_id.eq(g))
                    .filter(mc_links::channel_id.eq(c)),
            )
            .execute(conn)
        })?;
        Ok(removed > 0)
    }

    #[instrument(skip(self))]
    async fn link(&self, guild_id: GuildId, channel_id: ChannelId) -> StoreResult<Option<Link>> {
        let mut conn = self.conn.lock().await;

        let row = mc_links::table
            .find((guild_id.to_db(), channel_id.to_db()))
            .select(LinkRow::as_select())
            .first(&mut *conn)
            .optional()?;
        row.map(Link::try_from).transpose()
    }

    #[instrument(skip_all)]
    async fn links_by_hash(&self, token_hash: &str) -> StoreResult<Vec<Link>> {
        let mut conn = self.conn.lock().await;

        let rows = mc_links::table
            .filter(mc_links::token_hash.eq(token_hash))
            .order((mc_links::guild_id.asc(), mc_links::channel_id.asc()))
            .select(LinkRow::as_select())
            .load(&mut *conn)?;
        rows.into_iter().map(Link::try_from).collect()
    }

    #[instrument(skip(self, token_hash, server_name))]
    async fn set_link_status(
        &self,
        token_hash: &str,
        status: LinkStatus,
        server_name: Option<&str>,
        at: DateTime<Utc>,
    ) -> StoreResult<usize> {
        let mut conn = self.conn.lock().await;
        let target = mc_links::table.filter(mc_links::token_hash.eq(token_hash));

        let updated = match server_name {
            Some(name) => diesel::update(target)
                .set((
                    mc_links::status.eq(status.as_ref()),
                    mc_links::server_name.eq(name),
                    mc_links::last_seen.eq(at),
                ))
                .execute(&mut *conn)?,
            None => diesel::update(target)
                .set((
                    mc_links::status.eq(status.as_ref()),
                    mc_links::last_seen.eq(at),
                ))
                .execute(&mut *conn)?,
        };
        Ok(updated)
    }

    // ========================================================================
    // Delivery sinks
    // ========================================================================

    #[instrument(skip(self))]
    async fn sink(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> StoreResult<Option<DeliverySink>> {
        let mut conn = self.conn.lock().await;

        let row = mc_webhooks::table
            .find((guild_id.to_db(), channel_id.to_db()))
            .select(SinkRow::as_select())
            .first(&mut *conn)
            .optional()?;
        Ok(row.map(DeliverySink::from))
    }

    #[instrument(skip(self, sink), fields(guild_id = %sink.guild_id, channel_id = %sink.channel_id))]
    async fn upsert_sink(&self, sink: &DeliverySink) -> StoreResult<()> {
        let mut conn = self.conn.lock().await;
        let row = SinkRow::from(sink);

        diesel::insert_into(mc_webhooks::table)
            .values(&row)
            .on_conflict((mc_webhooks::guild_id, mc_webhooks::channel_id))
            .do_update()
            .set(&row)
            .execute(&mut *conn)?;
        Ok(())
    }

    // ========================================================================
    // Account links
    // ========================================================================

    #[instrument(skip(self))]
    async fn account_link_by_uuid(&self, mc_uuid: &str) -> StoreResult<Option<AccountLink>> {
        let mut conn = self.conn.lock().await;

        let row = user_links::table
            .filter(user_links::mc_uuid.eq(mc_uuid))
            .order((user_links::linked_at.asc(), user_links::guild_id.asc()))
            .select(AccountLinkRow::as_select())
            .first(&mut *conn)
            .optional()?;
        Ok(row.map(AccountLink::from))
    }

    #[instrument(skip(self))]
    async fn account_links_for_guild(&self, guild_id: GuildId) -> StoreResult<Vec<AccountLink>> {
        let mut conn = self.conn.lock().await;

        let rows = user_links::table
            .filter(user_links::guild_id.eq(guild_id.to_db()))
            .order((user_links::linked_at.asc(), user_links::discord_id.asc()))
            .select(AccountLinkRow::as_select())
            .load(&mut *conn)?;
        Ok(rows.into_iter().map(AccountLink::from).collect())
    }

    #[instrument(skip(self))]
    async fn set_notify_ping(
        &self,
        guild_id: GuildId,
        discord_id: UserId,
        enabled: bool,
    ) -> StoreResult<bool> {
        let mut conn = self.conn.lock().await;

        let updated = diesel::update(user_links::table.find((guild_id.to_db(), discord_id.to_db())))
            .set(user_links::notify_ping.eq(enabled))
            .execute(&mut *conn)?;
        Ok(updated > 0)
    }

    // ========================================================================
    // Guild settings
    // ========================================================================

    #[instrument(skip(self))]
    async fn cross_moderation_enabled(&self, guild_id: GuildId) -> StoreResult<bool> {
        let mut conn = self.conn.lock().await;

        let flag = guild_settings::table
            .find(guild_id.to_db())
            .select(guild_settings::cross_moderation)
            .first::<bool>(&mut *conn)
            .optional()?;
        Ok(flag.unwrap_or(true))
    }

    #[instrument(skip(self))]
    async fn set_cross_moderation(&self, guild_id: GuildId, enabled: bool) -> StoreResult<()> {
        let mut conn = self.conn.lock().await;
        let row = GuildSettingsRow {
            guild_id: guild_id.to_db(),
            cross_moderation: enabled,
        };

        diesel::insert_into(guild_settings::table)
            .values(&row)
            .on_conflict(guild_settings::guild_id)
            .do_update()
            .set(guild_settings::cross_moderation.eq(enabled))
            .execute(&mut *conn)?;
        Ok(())
    }

    // ========================================================================
    // Permission cache
    // ========================================================================

    #[instrument(skip(self, profile), fields(guild_id = %profile.guild_id))]
    async fn save_permission_profile(&self, profile: &PermissionProfile) -> StoreResult<()> {
        let mut conn = self.conn.lock().await;
        let mut row = PermissionRow::from(profile);

        conn.transaction::<(), diesel::result::Error, _>(|conn| {
            let existing = mc_perm_cache::table
                .find((row.guild_id, row.mc_uuid.as_str()))
                .select(mc_perm_cache::last_sync)
                .for_update()
                .first::<DateTime<Utc>>(conn)
                .optional()?;
            if let Some(previous) = existing {
                row.last_sync = row.last_sync.max(previous);
            }

            diesel::insert_into(mc_perm_cache::table)
                .values(&row)
                .on_conflict((mc_perm_cache::guild_id, mc_perm_cache::mc_uuid))
                .do_update()
                .set(&row)
                .execute(conn)?;
            Ok(())
        })?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn latest_permission_profile(
        &self,
        account_id: &str,
    ) -> StoreResult<Option<PermissionProfile>> {
        let mut conn = self.conn.lock().await;

        let row = mc_perm_cache::table
            .filter(mc_perm_cache::mc_uuid.eq(account_id))
            .order(mc_perm_cache::last_sync.desc())
            .select(PermissionRow::as_select())
            .first(&mut *conn)
            .optional()?;
        Ok(row.map(PermissionProfile::from))
    }

    // ========================================================================
    // Link tokens
    // ========================================================================

    #[instrument(skip(self, token), fields(mc_uuid = %token.mc_uuid))]
    async fn put_link_token(&self, token: &LinkToken) -> StoreResult<bool> {
        let mut conn = self.conn.lock().await;
        let row = LinkTokenRow::from(token);
        use diesel::query_dsl::methods::FilterDsl;

        // Used codes stay consumed; the conditional upsert touches no row.
        let affected = diesel::insert_into(link_tokens::table)
            .values(&row)
            .on_conflict(link_tokens::code)
            .do_update()
            .set(&row)
            .filter(link_tokens::used.eq(false))
            .execute(&mut *conn)?;
        Ok(affected > 0)
    }

    #[instrument(skip(self, code))]
    async fn redeem_link_token(
        &self,
        code: &str,
        guild_id: GuildId,
        discord_id: UserId,
        max_age: chrono::Duration,
        now: DateTime<Utc>,
    ) -> StoreResult<RedeemOutcome> {
        let mut conn = self.conn.lock().await;

        let outcome = conn.transaction::<RedeemOutcome, diesel::result::Error, _>(|conn| {
            let row = link_tokens::table
                .find(code)
                .select(LinkTokenRow::as_select())
                .for_update()
                .first(conn)
                .optional()?;
            let Some(row) = row else {
                return Ok(RedeemOutcome::UnknownCode);
            };
            let token = LinkToken::from(row);
            if token.used {
                return Ok(RedeemOutcome::AlreadyUsed);
            }
            if token.is_expired(now, max_age) {
                return Ok(RedeemOutcome::Expired);
            }

            let link = AccountLink {
                guild_id,
                discord_id,
                mc_uuid: token.mc_uuid,
                mc_name: token.mc_name,
                notify_ping: false,
                linked_at: now,
            };
            let link_row = AccountLinkRow::from(&link);
            diesel::insert_into(user_links::table)
                .values(&link_row)
                .on_conflict((user_links::guild_id, user_links::discord_id))
                .do_update()
                .set(&link_row)
                .execute(conn)?;
            diesel::update(link_tokens::table.find(code))
                .set(link_tokens::used.eq(true))
                .execute(conn)?;
            Ok(RedeemOutcome::Linked(link))
        })?;
        Ok(outcome)
    }

    #[instrument(skip(self))]
    async fn purge_link_tokens(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        let mut conn = self.conn.lock().await;

        diesel::delete(
            link_tokens::table
                .filter(link_tokens::used.eq(false))
                .filter(link_tokens::created_at.lt(cutoff)),
        )
        .execute(&mut *conn)
        .map_err(StoreError::from)
    }
}
