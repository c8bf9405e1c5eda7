//! Types shared by the collaborator traits.

use kavex_core::{AccountLink, ChannelId};
use kavex_error::{DeliveryError, DirectoryError, StoreError};
use serde::{Deserialize, Serialize};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for directory lookups.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Result type for outbound deliveries.
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Where a relayed message is posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkTarget {
    /// Webhook execution URL
    pub endpoint_url: String,
    /// Thread to route into via the `thread_id` query parameter
    pub thread_id: Option<ChannelId>,
}

/// JSON body of a webhook execution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WebhookMessage {
    /// Message text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Overridden author name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Overridden author avatar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Result of redeeming a link code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// Code consumed, account linked
    Linked(AccountLink),
    /// No such code
    UnknownCode,
    /// Code was redeemed before
    AlreadyUsed,
    /// Code is older than the allowed age
    Expired,
}
