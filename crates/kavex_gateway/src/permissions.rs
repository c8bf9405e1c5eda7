//! Moderation rights and chat cosmetics for linked Minecraft accounts.

use chrono::Utc;
use kavex_core::{
    ModerationCapability, PermissionProfile, PermissionSet, Permissions, RoleSnapshot,
};
use kavex_interface::{BridgeStore, Directory};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Capabilities derived from a native permission bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// May kick
    pub can_kick: bool,
    /// May ban
    pub can_ban: bool,
    /// May time out
    pub can_timeout: bool,
    /// Holds any moderation or management right
    pub is_staff: bool,
}

impl Capabilities {
    /// Derive capabilities from guild-level permissions.
    ///
    /// Administrator implies every capability.
    pub fn from_permissions(permissions: Permissions) -> Self {
        let admin = permissions.is_admin();
        let can_kick = admin || permissions.contains(Permissions::KICK_MEMBERS);
        let can_ban = admin || permissions.contains(Permissions::BAN_MEMBERS);
        let can_timeout = admin || permissions.contains(Permissions::MODERATE_MEMBERS);
        let management = Permissions::MANAGE_GUILD
            | Permissions::MANAGE_ROLES
            | Permissions::MANAGE_MESSAGES;
        let is_staff =
            can_kick || can_ban || can_timeout || admin || permissions.intersects(management);
        Self {
            can_kick,
            can_ban,
            can_timeout,
            is_staff,
        }
    }
}

// Ties go to the role listed first.
fn highest<'a>(roles: impl DoubleEndedIterator<Item = &'a RoleSnapshot>) -> Option<&'a RoleSnapshot> {
    roles.rev().max_by_key(|role| role.position)
}

/// Chat prefix and name colour for a member's non-default roles.
///
/// The colour comes from the highest coloured role. The prefix is the
/// bracketed name of the highest hoisted role, else the colour role, else the
/// highest role overall.
///
/// # Examples
///
/// ```
/// use kavex_core::RoleSnapshot;
/// use kavex_gateway::cosmetics;
///
/// let roles = vec![
///     RoleSnapshot { id: 1, name: "Staff".into(), position: 2, color: 0, hoist: true },
///     RoleSnapshot { id: 2, name: "VIP".into(), position: 5, color: 0x00FF00, hoist: false },
/// ];
/// let (prefix, color) = cosmetics(&roles);
/// assert_eq!(prefix.as_deref(), Some("[Staff]"));
/// assert_eq!(color.as_deref(), Some("#00FF00"));
/// ```
pub fn cosmetics(roles: &[RoleSnapshot]) -> (Option<String>, Option<String>) {
    let color_role = highest(roles.iter().filter(|role| role.is_colored()));
    let prefix_role = highest(roles.iter().filter(|role| role.hoist))
        .or(color_role)
        .or_else(|| highest(roles.iter()));

    (
        prefix_role.map(|role| format!("[{}]", role.name)),
        color_role.map(RoleSnapshot::color_hex),
    )
}

/// Resolves [`PermissionProfile`]s live, with the cache as fallback.
pub struct PermissionResolver {
    store: Arc<dyn BridgeStore>,
    directory: Arc<dyn Directory>,
}

impl PermissionResolver {
    /// Create a resolver over the given store and directory.
    pub fn new(store: Arc<dyn BridgeStore>, directory: Arc<dyn Directory>) -> Self {
        Self { store, directory }
    }

    /// Compute a fresh profile from the directory and write it to the cache.
    ///
    /// Returns `None` when the account is unlinked, its guild has
    /// cross-moderation disabled, or the member cannot be resolved.
    #[instrument(skip(self))]
    pub async fn resolve_live(&self, account_id: &str) -> Option<PermissionProfile> {
        let link = match self.store.account_link_by_uuid(account_id).await {
            Ok(Some(link)) => link,
            Ok(None) => {
                debug!("Account is not linked");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load account link");
                return None;
            }
        };

        match self.store.cross_moderation_enabled(link.guild_id).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(guild_id = %link.guild_id, "Cross-moderation disabled");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load guild settings");
                return None;
            }
        }

        let member = match self.directory.member(link.guild_id, link.discord_id).await {
            Ok(Some(member)) => member,
            Ok(None) => {
                debug!(discord_id = %link.discord_id, "Linked member left the guild");
                return None;
            }
            Err(e) => {
                debug!(error = %e, "Directory unavailable");
                return None;
            }
        };

        let caps = Capabilities::from_permissions(member.permissions);
        let (prefix, color) = cosmetics(&member.roles);
        let profile = PermissionProfile {
            guild_id: link.guild_id,
            account_id: account_id.to_string(),
            account_name: Some(link.mc_name),
            can_kick: caps.can_kick,
            can_ban: caps.can_ban,
            can_timeout: caps.can_timeout,
            is_staff: caps.is_staff,
            prefix,
            color,
            last_sync: Utc::now(),
        };

        if let Err(e) = self.store.save_permission_profile(&profile).await {
            warn!(error = %e, "Failed to cache permission profile");
        }
        Some(profile)
    }

    /// Most recent cached profile for the account in any guild.
    #[instrument(skip(self))]
    pub async fn cached(&self, account_id: &str) -> Option<PermissionProfile> {
        match self.store.latest_permission_profile(account_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "Failed to read permission cache");
                None
            }
        }
    }

    /// Live profile, else the cached one.
    pub async fn resolve(&self, account_id: &str) -> Option<PermissionProfile> {
        match self.resolve_live(account_id).await {
            Some(profile) => Some(profile),
            None => self.cached(account_id).await,
        }
    }

    /// `perm_set` reply for a `perm_query`.
    ///
    /// Always echoes `account_id`; carries the profile fields only when one
    /// could be resolved or read from cache.
    pub async fn permission_set(&self, account_id: &str) -> PermissionSet {
        match self.resolve(account_id).await {
            Some(profile) => PermissionSet::from_profile(account_id, &profile),
            None => PermissionSet::echo(account_id),
        }
    }

    /// Whether an in-game moderation command by `account_id` may proceed.
    #[instrument(skip(self))]
    pub async fn authorize(&self, account_id: &str, capability: ModerationCapability) -> bool {
        let allowed = self
            .resolve(account_id)
            .await
            .is_some_and(|profile| profile.allows(capability));
        debug!(allowed, "Authorization decided");
        allowed
    }
}
