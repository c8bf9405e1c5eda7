//! Bridge gateway between Minecraft server plugins and Discord.
//!
//! Minecraft plugins connect over a websocket and authenticate with a shared
//! secret. The gateway keeps one live connection per secret, relays player
//! chat, events and moderation actions into the Discord channels bound to
//! that secret, answers permission queries, and carries Discord-originated
//! chat and commands back into the game.
//!
//! # Components
//!
//! - [`Gateway`] - sessions, auth handshake, frame dispatch, outbound API
//! - [`ConnectionRegistry`] - live connections keyed by token hash
//! - [`ReadinessGate`] - buffers relay work until the directory is ready
//! - [`RelayEngine`] - fans events out to bound channels
//! - [`MentionTranslator`] - `@name` to `<@id>` for linked members
//! - [`SinkResolver`] - channel or thread to webhook endpoint
//! - [`PermissionResolver`] - live moderation rights with cache fallback
//! - [`server`] - axum websocket endpoint and health probe
//!
//! # Example
//!
//! ```rust,ignore
//! let gateway = Arc::new(Gateway::new(settings, store, directory, transport));
//! let listener = TcpListener::bind("0.0.0.0:8765").await?;
//! kavex_gateway::server::serve(listener, gateway, shutdown_signal()).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod gate;
mod gateway;
mod hashing;
mod mentions;
mod permissions;
mod registry;
mod relay;
mod settings;
mod sinks;

pub mod render;
pub mod server;

pub use gate::{PendingProcessor, ReadinessGate};
pub use gateway::{Gateway, Session};
pub use hashing::{SHORT_HASH_LEN, hash_token, short_hash};
pub use mentions::MentionTranslator;
pub use permissions::{Capabilities, PermissionResolver, cosmetics};
pub use registry::{ConnectionHandle, ConnectionRegistry, FrameSender};
pub use relay::{RelayEngine, RelayEvent};
pub use render::Notice;
pub use settings::{
    DEFAULT_HEARTBEAT, DEFAULT_LINK_TOKEN_MAX_AGE, DEFAULT_LINK_TOKEN_PURGE_INTERVAL,
    DEFAULT_WS_PATH, GatewaySettings, GatewaySettingsBuilder, GatewaySettingsBuilderError,
};
pub use sinks::SinkResolver;
