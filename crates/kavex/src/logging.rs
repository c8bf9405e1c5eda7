//! Tracing subscriber setup.

use kavex_error::{ConfigError, KavexResult};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the level filter, falling back to `info` when `directives` is blank.
pub fn env_filter(directives: &str) -> KavexResult<EnvFilter> {
    let directives = if directives.trim().is_empty() {
        "info"
    } else {
        directives
    };
    EnvFilter::try_new(directives).map_err(|e| {
        ConfigError::new(format!("Invalid log filter {:?}: {}", directives, e)).into()
    })
}

/// Install the global subscriber with a text or JSON formatter.
///
/// # Errors
///
/// Fails if the filter does not parse or a subscriber is already installed.
pub fn init_logging(directives: &str, json: bool) -> KavexResult<()> {
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(false).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter(directives)?)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install subscriber: {}", e)).into())
}
