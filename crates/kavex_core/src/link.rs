//! Persisted link rows.

use crate::{ChannelId, GuildId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a [`Link`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkStatus {
    /// Created by an admin, no server has authenticated yet
    #[default]
    Pending,
    /// A live connection is registered for the token hash
    Connected,
    /// The last connection for the token hash was torn down
    Disconnected,
}

/// Binding between a Discord channel (or thread) and a Minecraft server.
///
/// Keyed by `(guild_id, channel_id)`; several channels may share one
/// `token_hash`, in which case traffic from that server fans out to all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Guild owning the channel
    pub guild_id: GuildId,
    /// Channel or thread receiving relayed traffic
    pub channel_id: ChannelId,
    /// Peppered SHA-256 of the shared secret, lowercase hex
    pub token_hash: String,
    /// Name the server announced in its last auth
    pub server_name: Option<String>,
    /// Current lifecycle state
    pub status: LinkStatus,
    /// Last auth or teardown time
    pub last_seen: Option<DateTime<Utc>>,
}

impl Link {
    /// Create a new pending link.
    pub fn pending(guild_id: GuildId, channel_id: ChannelId, token_hash: impl Into<String>) -> Self {
        Self {
            guild_id,
            channel_id,
            token_hash: token_hash.into(),
            server_name: None,
            status: LinkStatus::Pending,
            last_seen: Some(Utc::now()),
        }
    }

    /// Server name for display, defaulting to "Minecraft".
    pub fn display_name(&self) -> &str {
        self.server_name.as_deref().unwrap_or("Minecraft")
    }
}

/// Outbound posting endpoint (webhook) for a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverySink {
    /// Guild owning the channel
    pub guild_id: GuildId,
    /// Channel the endpoint posts into
    pub channel_id: ChannelId,
    /// Full webhook execution URL
    pub endpoint_url: String,
    /// Thread to route into, when the endpoint is shared with a parent channel
    pub thread_id: Option<ChannelId>,
}

/// Discord account linked to a Minecraft account within one guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLink {
    /// Guild the link was made in
    pub guild_id: GuildId,
    /// Linked Discord user
    pub discord_id: UserId,
    /// Minecraft account UUID
    pub mc_uuid: String,
    /// Minecraft account name at link time
    pub mc_name: String,
    /// Whether Discord mentions of `mc_name` ping the player in game
    pub notify_ping: bool,
    /// When the link was redeemed
    pub linked_at: DateTime<Utc>,
}

/// Single-use code created in game and redeemed from Discord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkToken {
    /// Code shown to the player
    pub code: String,
    /// Requesting Minecraft account UUID
    pub mc_uuid: String,
    /// Requesting Minecraft account name
    pub mc_name: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Set once the code has been redeemed
    pub used: bool,
}

impl LinkToken {
    /// Whether the token is older than `max_age` at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        now - self.created_at > max_age
    }
}
