//! Scripted guild directory.

use async_trait::async_trait;
use kavex_core::{ChannelId, ChannelInfo, GuildId, MemberSnapshot, UserId};
use kavex_error::{DirectoryError, DirectoryErrorKind};
use kavex_interface::{Directory, DirectoryResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Directory answering from in-memory tables, switchable to "unavailable".
pub struct MockDirectory {
    members: Mutex<HashMap<GuildId, Vec<MemberSnapshot>>>,
    channels: Mutex<HashMap<ChannelId, ChannelInfo>>,
    available: AtomicBool,
    calls: AtomicUsize,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self {
            members: Mutex::new(HashMap::new()),
            channels: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    /// Members are listed in insertion order.
    pub fn add_member(&self, guild: u64, member: MemberSnapshot) {
        self.members
            .lock()
            .entry(GuildId(guild))
            .or_default()
            .push(member);
    }

    pub fn add_channel(&self, info: ChannelInfo) {
        self.channels.lock().insert(info.id, info);
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> DirectoryResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DirectoryError::new(DirectoryErrorKind::Unavailable(
                "scripted outage".to_string(),
            )))
        }
    }
}

#[async_trait]
impl Directory for MockDirectory {
    async fn member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> DirectoryResult<Option<MemberSnapshot>> {
        self.check()?;
        Ok(self
            .members
            .lock()
            .get(&guild_id)
            .and_then(|members| members.iter().find(|m| m.user_id == user_id).cloned()))
    }

    async fn members(&self, guild_id: GuildId) -> DirectoryResult<Vec<MemberSnapshot>> {
        self.check()?;
        Ok(self
            .members
            .lock()
            .get(&guild_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn channel(&self, channel_id: ChannelId) -> DirectoryResult<Option<ChannelInfo>> {
        self.check()?;
        Ok(self.channels.lock().get(&channel_id).copied())
    }
}
