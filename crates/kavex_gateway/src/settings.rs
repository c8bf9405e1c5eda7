//! Gateway tuning knobs.

use derive_getters::Getters;
use std::time::Duration;

/// Default websocket endpoint path.
pub const DEFAULT_WS_PATH: &str = "/mcws";
/// Default keepalive interval.
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(20);
/// Default maximum age of a link code.
pub const DEFAULT_LINK_TOKEN_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);
/// Default interval between link code purges.
pub const DEFAULT_LINK_TOKEN_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Runtime settings for a [`Gateway`](crate::Gateway).
///
/// # Examples
///
/// ```
/// use kavex_gateway::GatewaySettingsBuilder;
/// use std::time::Duration;
///
/// let settings = GatewaySettingsBuilder::default()
///     .token_pepper("pepper")
///     .heartbeat(Duration::from_secs(5))
///     .build()
///     .unwrap();
/// assert_eq!(settings.ws_path(), "/mcws");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct GatewaySettings {
    /// Deployment-wide secret appended to every token before hashing
    #[builder(default)]
    token_pepper: String,

    /// Path the websocket endpoint is mounted on
    #[builder(default = "DEFAULT_WS_PATH.to_string()")]
    ws_path: String,

    /// Keepalive interval; a ping left unanswered for one interval tears the socket down
    #[builder(default = "DEFAULT_HEARTBEAT")]
    heartbeat: Duration,

    /// Age after which an unused link code is rejected and purged
    #[builder(default = "DEFAULT_LINK_TOKEN_MAX_AGE")]
    link_token_max_age: Duration,

    /// How often expired link codes are purged
    #[builder(default = "DEFAULT_LINK_TOKEN_PURGE_INTERVAL")]
    link_token_purge_interval: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            token_pepper: String::new(),
            ws_path: DEFAULT_WS_PATH.to_string(),
            heartbeat: DEFAULT_HEARTBEAT,
            link_token_max_age: DEFAULT_LINK_TOKEN_MAX_AGE,
            link_token_purge_interval: DEFAULT_LINK_TOKEN_PURGE_INTERVAL,
        }
    }
}

impl GatewaySettings {
    /// Link code max age as a `chrono` duration, saturating on overflow.
    pub fn link_token_max_age_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.link_token_max_age).unwrap_or(chrono::Duration::MAX)
    }
}
