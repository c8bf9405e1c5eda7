//! Read-only snapshots returned by the guild directory.

use crate::{ChannelId, GuildId, Permissions, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A guild role as seen by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSnapshot {
    /// Role identifier
    pub id: u64,
    /// Display name
    pub name: String,
    /// Ordinal in the role list, higher ranks above lower
    pub position: i64,
    /// RGB colour, 0 meaning "no colour"
    pub color: u32,
    /// Shown separately in the member sidebar
    pub hoist: bool,
}

impl RoleSnapshot {
    /// Whether the role carries a non-default colour.
    pub fn is_colored(&self) -> bool {
        self.color != 0
    }

    /// Colour as `#RRGGBB`.
    pub fn color_hex(&self) -> String {
        format!("#{:06X}", self.color)
    }
}

/// A guild member as seen by the directory.
///
/// `roles` holds only the member's non-default roles (never `@everyone`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    /// Member's user id
    pub user_id: UserId,
    /// Account username
    pub username: String,
    /// Guild nickname
    pub nickname: Option<String>,
    /// Account-wide display name
    pub global_name: Option<String>,
    /// Effective guild-level permissions
    pub permissions: Permissions,
    /// Non-default roles
    pub roles: Vec<RoleSnapshot>,
    /// When the member joined the guild
    pub joined_at: Option<DateTime<Utc>>,
}

impl MemberSnapshot {
    /// Name shown in the guild: nickname, then global name, then username.
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .or(self.global_name.as_deref())
            .unwrap_or(&self.username)
    }

    /// Every name this member can be addressed by, display name first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.display_name()),
            Some(self.username.as_str()),
            self.global_name.as_deref(),
            self.nickname.as_deref(),
        ]
        .into_iter()
        .flatten()
    }
}

/// Channel facts needed for delivery routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Channel identifier
    pub id: ChannelId,
    /// Owning guild, if any
    pub guild_id: Option<GuildId>,
    /// Parent channel for threads
    pub parent_id: Option<ChannelId>,
    /// Whether this channel is a thread
    pub is_thread: bool,
}
