//! Guild permission bits and cached moderation profiles.

use crate::GuildId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discord guild permission bitset.
///
/// Only the bits the bridge inspects are named; all other bits are carried
/// through untouched.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::From,
)]
#[serde(transparent)]
pub struct Permissions(pub u64);

impl Permissions {
    /// Kick members
    pub const KICK_MEMBERS: Self = Self(1 << 1);
    /// Ban members
    pub const BAN_MEMBERS: Self = Self(1 << 2);
    /// Administrator (implies everything)
    pub const ADMINISTRATOR: Self = Self(1 << 3);
    /// Manage guild
    pub const MANAGE_GUILD: Self = Self(1 << 5);
    /// Manage messages
    pub const MANAGE_MESSAGES: Self = Self(1 << 13);
    /// Manage roles
    pub const MANAGE_ROLES: Self = Self(1 << 28);
    /// Time out members
    pub const MODERATE_MEMBERS: Self = Self(1 << 40);

    /// No permissions.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw bits.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any bit of `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Administrator bit set.
    pub const fn is_admin(self) -> bool {
        self.contains(Self::ADMINISTRATOR)
    }
}

impl std::ops::BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Permissions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Moderation capability requested from Minecraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ModerationCapability {
    /// Kick a member
    Kick,
    /// Ban a member
    Ban,
    /// Time a member out
    Timeout,
}

/// Snapshot of a linked account's moderation rights and chat cosmetics.
///
/// Keyed by `(guild_id, account_id)`. Snapshots are never evicted; a stale one
/// is preferred to none when the directory is unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionProfile {
    /// Guild the rights were computed in
    pub guild_id: GuildId,
    /// Minecraft account UUID
    pub account_id: String,
    /// Minecraft account name, when known
    pub account_name: Option<String>,
    /// May kick
    pub can_kick: bool,
    /// May ban
    pub can_ban: bool,
    /// May time out
    pub can_timeout: bool,
    /// Holds any moderation or management right
    pub is_staff: bool,
    /// Bracketed role name shown before chat
    pub prefix: Option<String>,
    /// `#RRGGBB` name colour
    pub color: Option<String>,
    /// When the snapshot was computed
    pub last_sync: DateTime<Utc>,
}

impl PermissionProfile {
    /// Whether this profile grants `capability`.
    pub fn allows(&self, capability: ModerationCapability) -> bool {
        match capability {
            ModerationCapability::Kick => self.can_kick,
            ModerationCapability::Ban => self.can_ban,
            ModerationCapability::Timeout => self.can_timeout,
        }
    }
}
