//! In-memory implementation of [`BridgeStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kavex_core::{
    AccountLink, ChannelId, DeliverySink, GuildId, Link, LinkStatus, LinkToken, PermissionProfile,
    UserId,
};
use kavex_interface::{BridgeStore, RedeemOutcome, StoreResult};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Tables {
    links: BTreeMap<(GuildId, ChannelId), Link>,
    sinks: BTreeMap<(GuildId, ChannelId), DeliverySink>,
    account_links: BTreeMap<(GuildId, UserId), AccountLink>,
    tokens: HashMap<String, LinkToken>,
    profiles: BTreeMap<(GuildId, String), PermissionProfile>,
    cross_moderation: HashMap<GuildId, bool>,
}

/// Volatile bridge store for tests and database-less runs.
///
/// All tables sit behind one lock, which makes every method atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBridgeStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryBridgeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an account link directly, bypassing the token flow.
    pub fn insert_account_link(&self, link: AccountLink) {
        self.tables
            .lock()
            .account_links
            .insert((link.guild_id, link.discord_id), link);
    }

    /// Every stored link, ordered by key.
    pub fn all_links(&self) -> Vec<Link> {
        self.tables.lock().links.values().cloned().collect()
    }

    /// Stored link token by code.
    pub fn link_token(&self, code: &str) -> Option<LinkToken> {
        self.tables.lock().tokens.get(code).cloned()
    }

    /// Cached profile for an exact `(guild, account)` key.
    pub fn permission_profile(&self, guild_id: GuildId, account_id: &str) -> Option<PermissionProfile> {
        self.tables
            .lock()
            .profiles
            .get(&(guild_id, account_id.to_string()))
            .cloned()
    }
}

#[async_trait]
impl BridgeStore for InMemoryBridgeStore {
    async fn upsert_link(&self, link: &Link) -> StoreResult<()> {
        self.tables
            .lock()
            .links
            .insert((link.guild_id, link.channel_id), link.clone());
        Ok(())
    }

    async fn remove_link(&self, guild_id: GuildId, channel_id: ChannelId) -> StoreResult<bool> {
        let mut tables = self.tables.lock();
        tables.sinks.remove(&(guild_id, channel_id));
        Ok(tables.links.remove(&(guild_id, channel_id)).is_some())
    }

    async fn link(&self, guild_id: GuildId, channel_id: ChannelId) -> StoreResult<Option<Link>> {
        Ok(self.tables.lock().links.get(&(guild_id, channel_id)).cloned())
    }

    async fn links_by_hash(&self, token_hash: &str) -> StoreResult<Vec<Link>> {
        Ok(self
            .tables
            .lock()
            .links
            .values()
            .filter(|link| link.token_hash == token_hash)
            .cloned()
            .collect())
    }

    async fn set_link_status(
        &self,
        token_hash: &str,
        status: LinkStatus,
        server_name: Option<&str>,
        at: DateTime<Utc>,
    ) -> StoreResult<usize> {
        let mut tables = self.tables.lock();
        let mut updated = 0;
        for link in tables
            .links
            .values_mut()
            .filter(|link| link.token_hash == token_hash)
        {
            link.status = status;
            if let Some(name) = server_name {
                link.server_name = Some(name.to_string());
            }
            link.last_seen = Some(at);
            updated += 1;
        }
        Ok(updated)
    }

    async fn sink(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> StoreResult<Option<DeliverySink>> {
        Ok(self.tables.lock().sinks.get(&(guild_id, channel_id)).cloned())
    }

    async fn upsert_sink(&self, sink: &DeliverySink) -> StoreResult<()> {
        self.tables
            .lock()
            .sinks
            .insert((sink.guild_id, sink.channel_id), sink.clone());
        Ok(())
    }

    async fn account_link_by_uuid(&self, mc_uuid: &str) -> StoreResult<Option<AccountLink>> {
        Ok(self
            .tables
            .lock()
            .account_links
            .values()
            .filter(|link| link.mc_uuid == mc_uuid)
            .min_by_key(|link| (link.linked_at, link.guild_id))
            .cloned())
    }

    async fn account_links_for_guild(&self, guild_id: GuildId) -> StoreResult<Vec<AccountLink>> {
        let mut links: Vec<AccountLink> = self
            .tables
            .lock()
            .account_links
            .values()
            .filter(|link| link.guild_id == guild_id)
            .cloned()
            .collect();
        links.sort_by_key(|link| (link.linked_at, link.discord_id));
        Ok(links)
    }

    async fn set_notify_ping(
        &self,
        guild_id: GuildId,
        discord_id: UserId,
        enabled: bool,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.lock();
        match tables.account_links.get_mut(&(guild_id, discord_id)) {
            Some(link) => {
                link.notify_ping = enabled;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn cross_moderation_enabled(&self, guild_id: GuildId) -> StoreResult<bool> {
        Ok(self
            .tables
            .lock()
            .cross_moderation
            .get(&guild_id)
            .copied()
            .unwrap_or(true))
    }

    async fn set_cross_moderation(&self, guild_id: GuildId, enabled: bool) -> StoreResult<()> {
        self.tables.lock().cross_moderation.insert(guild_id, enabled);
        Ok(())
    }

    async fn save_permission_profile(&self, profile: &PermissionProfile) -> StoreResult<()> {
        let mut tables = self.tables.lock();
        let key = (profile.guild_id, profile.account_id.clone());
        let mut next = profile.clone();
        if let Some(previous) = tables.profiles.get(&key) {
            next.last_sync = next.last_sync.max(previous.last_sync);
        }
        tables.profiles.insert(key, next);
        Ok(())
    }

    async fn latest_permission_profile(
        &self,
        account_id: &str,
    ) -> StoreResult<Option<PermissionProfile>> {
        Ok(self
            .tables
            .lock()
            .profiles
            .values()
            .filter(|profile| profile.account_id == account_id)
            .max_by_key(|profile| profile.last_sync)
            .cloned())
    }

    async fn put_link_token(&self, token: &LinkToken) -> StoreResult<bool> {
        let mut tables = self.tables.lock();
        if tables.tokens.get(&token.code).is_some_and(|existing| existing.used) {
            return Ok(false);
        }
        tables.tokens.insert(token.code.clone(), token.clone());
        Ok(true)
    }

    async fn redeem_link_token(
        &self,
        code: &str,
        guild_id: GuildId,
        discord_id: UserId,
        max_age: chrono::Duration,
        now: DateTime<Utc>,
    ) -> StoreResult<RedeemOutcome> {
        let mut tables = self.tables.lock();
        let Some(token) = tables.tokens.get_mut(code) else {
            return Ok(RedeemOutcome::UnknownCode);
        };
        if token.used {
            return Ok(RedeemOutcome::AlreadyUsed);
        }
        if token.is_expired(now, max_age) {
            return Ok(RedeemOutcome::Expired);
        }
        token.used = true;

        let link = AccountLink {
            guild_id,
            discord_id,
            mc_uuid: token.mc_uuid.clone(),
            mc_name: token.mc_name.clone(),
            notify_ping: false,
            linked_at: now,
        };
        tables
            .account_links
            .insert((guild_id, discord_id), link.clone());
        Ok(RedeemOutcome::Linked(link))
    }

    async fn purge_link_tokens(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        let mut tables = self.tables.lock();
        let before = tables.tokens.len();
        tables
            .tokens
            .retain(|_, token| token.used || token.created_at >= cutoff);
        Ok(before - tables.tokens.len())
    }
}
