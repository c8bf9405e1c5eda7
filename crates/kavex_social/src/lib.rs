//! Discord side of the Kavex bridge.
//!
//! - [`SerenityDirectory`] - guild directory over serenity's member cache
//! - [`WebhookClient`] - webhook delivery for relayed Minecraft traffic
//! - [`ChatForwarder`] / [`BridgeHandler`] - Discord chat into linked servers
//! - [`BridgeBot`] - serenity client lifecycle
//!
//! ```rust,ignore
//! let directory = Arc::new(SerenityDirectory::new());
//! let handler = BridgeHandler::new(gateway, store, directory);
//! let mut bot = BridgeBot::new(&token, handler).await?;
//! bot.start().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod directory;
mod error;
mod format;
mod forward;
mod handler;
mod webhook;

pub use client::BridgeBot;
pub use directory::SerenityDirectory;
pub use error::{DiscordError, DiscordErrorKind, DiscordResult};
pub use format::{
    MC_CODE, MC_RESET, MC_UNDERLINE, MinecraftFormatter, pinged_names, underline_pings,
};
pub use forward::{ChatForwarder, DiscordMessage};
pub use handler::BridgeHandler;
pub use webhook::{DEFAULT_WEBHOOK_TIMEOUT, WebhookClient};
