//! Test utilities for Discord-side tests.

#![allow(dead_code)]

use async_trait::async_trait;
use kavex_core::{ChannelId, ChannelInfo, GuildId, MemberSnapshot, OutboundFrame, Permissions, UserId};
use kavex_database::InMemoryBridgeStore;
use kavex_gateway::{Gateway, GatewaySettings, Session};
use kavex_interface::{
    DeliveryResult, Directory, DirectoryResult, SinkTarget, SinkTransport, WebhookMessage,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Directory over a fixed member table.
#[derive(Default)]
pub struct StaticDirectory {
    members: Mutex<HashMap<(GuildId, UserId), MemberSnapshot>>,
}

impl StaticDirectory {
    pub fn add(&self, guild: u64, member: MemberSnapshot) {
        self.members
            .lock()
            .insert((GuildId(guild), member.user_id), member);
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> DirectoryResult<Option<MemberSnapshot>> {
        Ok(self.members.lock().get(&(guild_id, user_id)).cloned())
    }

    async fn members(&self, guild_id: GuildId) -> DirectoryResult<Vec<MemberSnapshot>> {
        Ok(self
            .members
            .lock()
            .iter()
            .filter(|((guild, _), _)| *guild == guild_id)
            .map(|(_, member)| member.clone())
            .collect())
    }

    async fn channel(&self, _channel_id: ChannelId) -> DirectoryResult<Option<ChannelInfo>> {
        Ok(None)
    }
}

/// Transport that accepts and drops every post.
pub struct NullTransport;

#[async_trait]
impl SinkTransport for NullTransport {
    async fn post(&self, _target: &SinkTarget, _message: &WebhookMessage) -> DeliveryResult<()> {
        Ok(())
    }
}

pub fn member(id: u64, username: &str) -> MemberSnapshot {
    MemberSnapshot {
        user_id: UserId(id),
        username: username.to_string(),
        nickname: None,
        global_name: None,
        permissions: Permissions::empty(),
        roles: Vec::new(),
        joined_at: None,
    }
}

/// Gateway over in-memory fakes.
pub struct Fixture {
    pub store: Arc<InMemoryBridgeStore>,
    pub directory: Arc<StaticDirectory>,
    pub gateway: Arc<Gateway>,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryBridgeStore::new());
        let directory = Arc::new(StaticDirectory::default());
        let gateway = Arc::new(Gateway::new(
            GatewaySettings::default(),
            store.clone(),
            directory.clone(),
            Arc::new(NullTransport),
        ));
        gateway.mark_ready();
        Self {
            store,
            directory,
            gateway,
        }
    }

    /// Bind `(guild, channel)` to `token` and connect a server with it.
    pub async fn connect(
        &self,
        guild: u64,
        channel: u64,
        token: &str,
    ) -> (Session, mpsc::UnboundedReceiver<OutboundFrame>) {
        self.gateway
            .register_link(GuildId(guild), ChannelId(channel), token)
            .await
            .expect("register link");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = self.gateway.open_session(tx);
        let auth = format!(r#"{{"op":"auth","token":"{token}","server":"Survival"}}"#);
        self.gateway.handle_text(&mut session, &auth).await;
        assert_eq!(rx.try_recv().ok(), Some(OutboundFrame::auth_ok()));
        (session, rx)
    }
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<OutboundFrame>) -> Vec<OutboundFrame> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    frames
}
