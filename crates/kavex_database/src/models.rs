//! Row types for the bridge tables and their conversions to core types.

use crate::schema::{guild_settings, link_tokens, mc_links, mc_perm_cache, mc_webhooks, user_links};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use kavex_core::{
    AccountLink, ChannelId, DeliverySink, GuildId, Link, LinkStatus, LinkToken, PermissionProfile,
    UserId,
};
use kavex_error::{StoreError, StoreErrorKind};

/// Row of `mc_links`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = mc_links)]
#[diesel(primary_key(guild_id, channel_id))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LinkRow {
    pub guild_id: i64,
    pub channel_id: i64,
    pub token_hash: String,
    pub server_name: Option<String>,
    pub status: String,
    pub last_seen: Option<DateTime<Utc>>,
}

impl From<&Link> for LinkRow {
    fn from(link: &Link) -> Self {
        Self {
            guild_id: link.guild_id.to_db(),
            channel_id: link.channel_id.to_db(),
            token_hash: link.token_hash.clone(),
            server_name: link.server_name.clone(),
            status: link.status.to_string(),
            last_seen: link.last_seen,
        }
    }
}

impl TryFrom<LinkRow> for Link {
    type Error = StoreError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<LinkStatus>().map_err(|_| {
            StoreError::new(StoreErrorKind::Serialization(format!(
                "unknown link status '{}'",
                row.status
            )))
        })?;
        Ok(Self {
            guild_id: GuildId::from_db(row.guild_id),
            channel_id: ChannelId::from_db(row.channel_id),
            token_hash: row.token_hash,
            server_name: row.server_name,
            status,
            last_seen: row.last_seen,
        })
    }
}

/// Row of `mc_webhooks`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = mc_webhooks)]
#[diesel(primary_key(guild_id, channel_id))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SinkRow {
    pub guild_id: i64,
    pub channel_id: i64,
    pub endpoint_url: String,
    pub thread_id: Option<i64>,
}

impl From<&DeliverySink> for SinkRow {
    fn from(sink: &DeliverySink) -> Self {
        Self {
            guild_id: sink.guild_id.to_db(),
            channel_id: sink.channel_id.to_db(),
            endpoint_url: sink.endpoint_url.clone(),
            thread_id: sink.thread_id.map(ChannelId::to_db),
        }
    }
}

impl From<SinkRow> for DeliverySink {
    fn from(row: SinkRow) -> Self {
        Self {
            guild_id: GuildId::from_db(row.guild_id),
            channel_id: ChannelId::from_db(row.channel_id),
            endpoint_url: row.endpoint_url,
            thread_id: row.thread_id.map(ChannelId::from_db),
        }
    }
}

/// Row of `user_links`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = user_links)]
#[diesel(primary_key(guild_id, discord_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccountLinkRow {
    pub guild_id: i64,
    pub discord_id: i64,
    pub mc_uuid: String,
    pub mc_name: String,
    pub notify_ping: bool,
    pub linked_at: DateTime<Utc>,
}

impl From<&AccountLink> for AccountLinkRow {
    fn from(link: &AccountLink) -> Self {
        Self {
            guild_id: link.guild_id.to_db(),
            discord_id: link.discord_id.to_db(),
            mc_uuid: link.mc_uuid.clone(),
            mc_name: link.mc_name.clone(),
            notify_ping: link.notify_ping,
            linked_at: link.linked_at,
        }
    }
}

impl From<AccountLinkRow> for AccountLink {
    fn from(row: AccountLinkRow) -> Self {
        Self {
            guild_id: GuildId::from_db(row.guild_id),
            discord_id: UserId::from_db(row.discord_id),
            mc_uuid: row.mc_uuid,
            mc_name: row.mc_name,
            notify_ping: row.notify_ping,
            linked_at: row.linked_at,
        }
    }
}

/// Row of `link_tokens`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = link_tokens)]
#[diesel(primary_key(code))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LinkTokenRow {
    pub code: String,
    pub mc_uuid: String,
    pub mc_name: String,
    pub created_at: DateTime<Utc>,
    pub used: bool,
}

impl From<&LinkToken> for LinkTokenRow {
    fn from(token: &LinkToken) -> Self {
        Self {
            code: token.code.clone(),
            mc_uuid: token.mc_uuid.clone(),
            mc_name: token.mc_name.clone(),
            created_at: token.created_at,
            used: token.used,
        }
    }
}

impl From<LinkTokenRow> for LinkToken {
    fn from(row: LinkTokenRow) -> Self {
        Self {
            code: row.code,
            mc_uuid: row.mc_uuid,
            mc_name: row.mc_name,
            created_at: row.created_at,
            used: row.used,
        }
    }
}

/// Row of `mc_perm_cache`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = mc_perm_cache)]
#[diesel(primary_key(guild_id, mc_uuid))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PermissionRow {
    pub guild_id: i64,
    pub mc_uuid: String,
    pub mc_name: Option<String>,
    pub can_kick: bool,
    pub can_ban: bool,
    pub can_timeout: bool,
    pub is_staff: bool,
    pub prefix: Option<String>,
    pub color_hex: Option<String>,
    pub last_sync: DateTime<Utc>,
}

impl From<&PermissionProfile> for PermissionRow {
    fn from(profile: &PermissionProfile) -> Self {
        Self {
            guild_id: profile.guild_id.to_db(),
            mc_uuid: profile.account_id.clone(),
            mc_name: profile.account_name.clone(),
            can_kick: profile.can_kick,
            can_ban: profile.can_ban,
            can_timeout: profile.can_timeout,
            is_staff: profile.is_staff,
            prefix: profile.prefix.clone(),
            color_hex: profile.color.clone(),
            last_sync: profile.last_sync,
        }
    }
}

impl From<PermissionRow> for PermissionProfile {
    fn from(row: PermissionRow) -> Self {
        Self {
            guild_id: GuildId::from_db(row.guild_id),
            account_id: row.mc_uuid,
            account_name: row.mc_name,
            can_kick: row.can_kick,
            can_ban: row.can_ban,
            can_timeout: row.can_timeout,
            is_staff: row.is_staff,
            prefix: row.prefix,
            color: row.color_hex,
            last_sync: row.last_sync,
        }
    }
}

/// Row of `guild_settings`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = guild_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GuildSettingsRow {
    pub guild_id: i64,
    pub cross_moderation: bool,
}
