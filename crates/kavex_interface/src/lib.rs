//! Trait seams between the Kavex gateway and its external collaborators.
//!
//! The gateway never talks to PostgreSQL, Discord or HTTP directly. It goes
//! through three traits:
//!
//! - [`BridgeStore`] - transactional row store for links, sinks, account links,
//!   link tokens, the permission cache and guild settings
//! - [`Directory`] - fallible, read-only view of guild members, roles and channels
//! - [`SinkTransport`] - outbound posting to a delivery sink (webhook)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{BridgeStore, Directory, SinkTransport};
pub use types::{DeliveryResult, DirectoryResult, RedeemOutcome, SinkTarget, StoreResult, WebhookMessage};
