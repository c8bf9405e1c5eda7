//! Test utilities for gateway tests.
//!
//! Mock collaborators plus a harness wiring them into a [`Gateway`].

#![allow(dead_code)]

pub mod mock_directory;
pub mod recording_transport;

#[allow(unused_imports)]
pub use mock_directory::MockDirectory;
#[allow(unused_imports)]
pub use recording_transport::{Post, RecordingTransport};

use chrono::{TimeZone, Utc};
use kavex_core::{
    AccountLink, ChannelId, DeliverySink, GuildId, MemberSnapshot, OutboundFrame, Permissions,
    RoleSnapshot, UserId,
};
use kavex_database::InMemoryBridgeStore;
use kavex_gateway::{DEFAULT_HEARTBEAT, Gateway, GatewaySettingsBuilder, Session};
use kavex_interface::BridgeStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const PEPPER: &str = "test-pepper";

/// Member with a username and optional nickname, joined at `joined` seconds.
pub fn member(id: u64, username: &str, joined: i64) -> MemberSnapshot {
    MemberSnapshot {
        user_id: UserId(id),
        username: username.to_string(),
        nickname: None,
        global_name: None,
        permissions: Permissions::empty(),
        roles: Vec::new(),
        joined_at: Utc.timestamp_opt(joined, 0).single(),
    }
}

/// Role snapshot.
pub fn role(id: u64, name: &str, position: i64, color: u32, hoist: bool) -> RoleSnapshot {
    RoleSnapshot {
        id,
        name: name.to_string(),
        position,
        color,
        hoist,
    }
}

/// Account link for `user` in `guild`.
pub fn account_link(guild: u64, user: u64, uuid: &str, name: &str) -> AccountLink {
    AccountLink {
        guild_id: GuildId(guild),
        discord_id: UserId(user),
        mc_uuid: uuid.to_string(),
        mc_name: name.to_string(),
        notify_ping: true,
        linked_at: Utc.timestamp_opt(1_000, 0).single().unwrap_or_else(Utc::now),
    }
}

/// Webhook URL used for a channel's sink.
pub fn hook_url(channel: u64) -> String {
    format!("https://hooks.test/{channel}")
}

/// Gateway wired to in-memory fakes.
pub struct Harness {
    pub store: Arc<InMemoryBridgeStore>,
    pub directory: Arc<MockDirectory>,
    pub transport: Arc<RecordingTransport>,
    pub gateway: Arc<Gateway>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_heartbeat(DEFAULT_HEARTBEAT)
    }

    pub fn with_heartbeat(heartbeat: Duration) -> Self {
        let store = Arc::new(InMemoryBridgeStore::new());
        let directory = Arc::new(MockDirectory::new());
        let transport = Arc::new(RecordingTransport::new());
        let settings = GatewaySettingsBuilder::default()
            .token_pepper(PEPPER)
            .heartbeat(heartbeat)
            .build()
            .expect("valid settings");
        let gateway = Arc::new(Gateway::new(
            settings,
            store.clone(),
            directory.clone(),
            transport.clone(),
        ));
        Self {
            store,
            directory,
            transport,
            gateway,
        }
    }

    /// Harness whose gate is already open.
    pub fn ready() -> Self {
        let harness = Self::new();
        harness.gateway.mark_ready();
        harness
    }

    /// New socket session and the receiving end of its frames.
    pub fn session(&self) -> (Session, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.gateway.open_session(tx), rx)
    }

    /// Register a link for `(guild, channel)` and give it a webhook sink.
    pub async fn bind(&self, guild: u64, channel: u64, token: &str) {
        self.gateway
            .register_link(GuildId(guild), ChannelId(channel), token)
            .await
            .expect("register link");
        self.store
            .upsert_sink(&DeliverySink {
                guild_id: GuildId(guild),
                channel_id: ChannelId(channel),
                endpoint_url: hook_url(channel),
                thread_id: None,
            })
            .await
            .expect("upsert sink");
    }

    /// Authenticate `session` with `token` and `server`.
    pub async fn auth(&self, session: &mut Session, token: &str, server: &str) {
        let frame = format!(r#"{{"op":"auth","token":"{token}","server":"{server}"}}"#);
        self.gateway.handle_text(session, &frame).await;
    }
}

/// Drain every frame currently queued for a session.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<OutboundFrame>) -> Vec<OutboundFrame> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    frames
}
