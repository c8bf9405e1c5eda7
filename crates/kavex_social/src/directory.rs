//! Guild directory backed by the serenity cache.

use async_trait::async_trait;
use chrono::DateTime;
use kavex_core::{ChannelId, ChannelInfo, GuildId, MemberSnapshot, Permissions, RoleSnapshot, UserId};
use kavex_error::{DirectoryError, DirectoryErrorKind};
use kavex_interface::{Directory, DirectoryResult};
use parking_lot::RwLock;
use serenity::cache::Cache;
use serenity::http::Http;
use serenity::model::channel::{Channel, ChannelType, GuildChannel};
use serenity::model::guild::{Guild, Member, Role};
use serenity::model::id as sid;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Clone)]
struct Handles {
    cache: Arc<Cache>,
    http: Arc<Http>,
}

/// [`Directory`] answering from serenity's member cache.
///
/// Every query fails with [`DirectoryErrorKind::NotReady`] until
/// [`attach`](Self::attach) is called from the `cache_ready` event.
#[derive(Default)]
pub struct SerenityDirectory {
    handles: RwLock<Option<Handles>>,
}

impl SerenityDirectory {
    /// Create a detached directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the live cache and HTTP handles.
    pub fn attach(&self, cache: Arc<Cache>, http: Arc<Http>) {
        *self.handles.write() = Some(Handles { cache, http });
        info!("Directory attached to Discord cache");
    }

    /// Whether the cache handles are attached.
    pub fn is_attached(&self) -> bool {
        self.handles.read().is_some()
    }

    /// Cached guild name.
    pub fn guild_name(&self, guild_id: GuildId) -> Option<String> {
        let handles = self.handles().ok()?;
        let guild = handles.cache.guild(to_guild(guild_id)?)?;
        Some(guild.name.clone())
    }

    fn handles(&self) -> DirectoryResult<Handles> {
        self.handles
            .read()
            .clone()
            .ok_or_else(|| DirectoryError::new(DirectoryErrorKind::NotReady))
    }
}

fn to_guild(id: GuildId) -> Option<sid::GuildId> {
    (id.get() != 0).then(|| sid::GuildId::new(id.get()))
}

fn to_user(id: UserId) -> Option<sid::UserId> {
    (id.get() != 0).then(|| sid::UserId::new(id.get()))
}

fn to_channel(id: ChannelId) -> Option<sid::ChannelId> {
    (id.get() != 0).then(|| sid::ChannelId::new(id.get()))
}

fn guild_not_cached(guild_id: GuildId) -> DirectoryError {
    DirectoryError::new(DirectoryErrorKind::Unavailable(format!(
        "guild {guild_id} is not cached"
    )))
}

fn role_snapshot(role: &Role) -> RoleSnapshot {
    RoleSnapshot {
        id: role.id.get(),
        name: role.name.clone(),
        position: i64::from(role.position),
        color: role.colour.0,
        hoist: role.hoist,
    }
}

// Owner holds everything; otherwise @everyone plus each held role.
fn member_permissions(guild: &Guild, member: &Member) -> u64 {
    if guild.owner_id == member.user.id {
        return serenity::model::Permissions::all().bits();
    }
    let everyone = guild
        .roles
        .get(&sid::RoleId::new(guild.id.get()))
        .map(|role| role.permissions)
        .unwrap_or_else(serenity::model::Permissions::empty);
    member
        .roles
        .iter()
        .filter_map(|id| guild.roles.get(id))
        .fold(everyone, |acc, role| acc | role.permissions)
        .bits()
}

fn member_snapshot(guild: &Guild, member: &Member) -> MemberSnapshot {
    let roles = member
        .roles
        .iter()
        .filter(|id| id.get() != guild.id.get())
        .filter_map(|id| guild.roles.get(id))
        .map(role_snapshot)
        .collect();
    MemberSnapshot {
        user_id: UserId(member.user.id.get()),
        username: member.user.name.clone(),
        nickname: member.nick.clone(),
        global_name: member.user.global_name.clone(),
        permissions: Permissions(member_permissions(guild, member)),
        roles,
        joined_at: member
            .joined_at
            .and_then(|at| DateTime::from_timestamp(at.unix_timestamp(), 0)),
    }
}

fn is_thread(kind: ChannelType) -> bool {
    matches!(
        kind,
        ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread
    )
}

fn channel_info(channel: &GuildChannel) -> ChannelInfo {
    ChannelInfo {
        id: ChannelId(channel.id.get()),
        guild_id: Some(GuildId(channel.guild_id.get())),
        parent_id: channel.parent_id.map(|id| ChannelId(id.get())),
        is_thread: is_thread(channel.kind),
    }
}

#[async_trait]
impl Directory for SerenityDirectory {
    #[instrument(skip(self))]
    async fn member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> DirectoryResult<Option<MemberSnapshot>> {
        let handles = self.handles()?;
        let (Some(guild_key), Some(user_key)) = (to_guild(guild_id), to_user(user_id)) else {
            return Ok(None);
        };
        let guild = handles
            .cache
            .guild(guild_key)
            .ok_or_else(|| guild_not_cached(guild_id))?;
        Ok(guild
            .members
            .get(&user_key)
            .map(|member| member_snapshot(&guild, member)))
    }

    #[instrument(skip(self))]
    async fn members(&self, guild_id: GuildId) -> DirectoryResult<Vec<MemberSnapshot>> {
        let handles = self.handles()?;
        let Some(guild_key) = to_guild(guild_id) else {
            return Ok(Vec::new());
        };
        let mut members: Vec<MemberSnapshot> = {
            let guild = handles
                .cache
                .guild(guild_key)
                .ok_or_else(|| guild_not_cached(guild_id))?;
            guild
                .members
                .values()
                .map(|member| member_snapshot(&guild, member))
                .collect()
        };
        // Stable order for first-wins name resolution.
        members.sort_by_key(|m| (m.joined_at.is_none(), m.joined_at, m.user_id));
        Ok(members)
    }

    #[instrument(skip(self))]
    async fn channel(&self, channel_id: ChannelId) -> DirectoryResult<Option<ChannelInfo>> {
        let handles = self.handles()?;
        let Some(channel_key) = to_channel(channel_id) else {
            return Ok(None);
        };
        let cached = handles
            .cache
            .channel(channel_key)
            .map(|channel| channel_info(&channel));
        if cached.is_some() {
            return Ok(cached);
        }

        // Threads are not in the channel index; ask the API.
        debug!("Channel not cached, fetching");
        match handles.http.get_channel(channel_key).await {
            Ok(Channel::Guild(channel)) => Ok(Some(channel_info(&channel))),
            Ok(_) => Ok(None),
            Err(e) => Err(DirectoryError::new(DirectoryErrorKind::Http(e.to_string()))),
        }
    }
}
