//! Collaborator trait definitions.

use crate::{DeliveryResult, DirectoryResult, RedeemOutcome, SinkTarget, StoreResult, WebhookMessage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kavex_core::{
    AccountLink, ChannelId, ChannelInfo, DeliverySink, GuildId, Link, LinkStatus, LinkToken,
    MemberSnapshot, PermissionProfile, UserId,
};

/// Transactional row store backing the bridge.
///
/// Implementations must make each method atomic; the gateway relies on that
/// for link token redemption and permission cache monotonicity.
#[async_trait]
pub trait BridgeStore: Send + Sync {
    /// Insert or replace a link keyed by `(guild_id, channel_id)`.
    async fn upsert_link(&self, link: &Link) -> StoreResult<()>;

    /// Remove a link and the delivery sink of the same channel.
    ///
    /// Returns whether a link existed.
    async fn remove_link(&self, guild_id: GuildId, channel_id: ChannelId) -> StoreResult<bool>;

    /// Look up the link for one channel.
    async fn link(&self, guild_id: GuildId, channel_id: ChannelId) -> StoreResult<Option<Link>>;

    /// Every link bound to a token hash.
    async fn links_by_hash(&self, token_hash: &str) -> StoreResult<Vec<Link>>;

    /// Set status (and optionally server name) on every link bound to a token
    /// hash, stamping `last_seen`. Returns the number of rows updated.
    async fn set_link_status(
        &self,
        token_hash: &str,
        status: LinkStatus,
        server_name: Option<&str>,
        at: DateTime<Utc>,
    ) -> StoreResult<usize>;

    /// Stored delivery sink for an exact channel.
    async fn sink(&self, guild_id: GuildId, channel_id: ChannelId)
    -> StoreResult<Option<DeliverySink>>;

    /// Insert or replace a delivery sink.
    async fn upsert_sink(&self, sink: &DeliverySink) -> StoreResult<()>;

    /// Earliest account link for a Minecraft UUID across all guilds.
    async fn account_link_by_uuid(&self, mc_uuid: &str) -> StoreResult<Option<AccountLink>>;

    /// All account links in a guild, oldest first.
    async fn account_links_for_guild(&self, guild_id: GuildId) -> StoreResult<Vec<AccountLink>>;

    /// Toggle mention pings for a linked account. Returns whether a link existed.
    async fn set_notify_ping(
        &self,
        guild_id: GuildId,
        discord_id: UserId,
        enabled: bool,
    ) -> StoreResult<bool>;

    /// Whether cross-moderation is enabled for a guild (default `true`).
    async fn cross_moderation_enabled(&self, guild_id: GuildId) -> StoreResult<bool>;

    /// Set the guild cross-moderation flag.
    async fn set_cross_moderation(&self, guild_id: GuildId, enabled: bool) -> StoreResult<()>;

    /// Overwrite the cached profile for `(guild_id, account_id)`.
    ///
    /// `last_sync` must never move backwards.
    async fn save_permission_profile(&self, profile: &PermissionProfile) -> StoreResult<()>;

    /// Most recently synced profile for an account in any guild.
    async fn latest_permission_profile(
        &self,
        account_id: &str,
    ) -> StoreResult<Option<PermissionProfile>>;

    /// Insert or overwrite a link token keyed by its code.
    ///
    /// A token already marked used is never overwritten; returns `false` in
    /// that case.
    async fn put_link_token(&self, token: &LinkToken) -> StoreResult<bool>;

    /// Consume a link token and record the resulting account link, atomically.
    async fn redeem_link_token(
        &self,
        code: &str,
        guild_id: GuildId,
        discord_id: UserId,
        max_age: chrono::Duration,
        now: DateTime<Utc>,
    ) -> StoreResult<RedeemOutcome>;

    /// Delete unused link tokens created before `cutoff`. Returns the count.
    async fn purge_link_tokens(&self, cutoff: DateTime<Utc>) -> StoreResult<usize>;
}

/// Read-only, fallible view of guild membership.
///
/// Any `Err` means "directory unavailable"; `Ok(None)` means the entity does
/// not exist (e.g. the member left the guild).
#[async_trait]
pub trait Directory: Send + Sync {
    /// One member with effective permissions and non-default roles.
    async fn member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> DirectoryResult<Option<MemberSnapshot>>;

    /// All known members of a guild, in a stable order (join time, then id).
    async fn members(&self, guild_id: GuildId) -> DirectoryResult<Vec<MemberSnapshot>>;

    /// Channel routing facts.
    async fn channel(&self, channel_id: ChannelId) -> DirectoryResult<Option<ChannelInfo>>;
}

/// Outbound posting to a delivery sink.
#[async_trait]
pub trait SinkTransport: Send + Sync {
    /// Post one message.
    async fn post(&self, target: &SinkTarget, message: &WebhookMessage) -> DeliveryResult<()>;

    /// Release pooled resources. Later posts may recreate them.
    async fn shutdown(&self) {}
}
