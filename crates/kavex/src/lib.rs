//! Kavex bridge server.
//!
//! Wires the websocket [`Gateway`](kavex_gateway::Gateway), the PostgreSQL
//! store and the Discord bot into one process, configured from a TOML file
//! and the environment.
//!
//! # Cargo Features
//!
//! - `observability` - export tracing spans through OpenTelemetry (stdout)

#![warn(missing_docs)]

mod cli;
mod config;
mod logging;
#[cfg(feature = "observability")]
mod observability;

pub use cli::{Cli, Commands, run_migrate, run_serve};
pub use config::{
    BridgeConfig, ENV_DATABASE_URL, ENV_DISCORD_TOKEN, ENV_HEARTBEAT_SECS, ENV_HOST,
    ENV_LINK_TOKEN_MAX_AGE_SECS, ENV_LINK_TOKEN_PURGE_SECS, ENV_LOG_JSON, ENV_LOG_LEVEL,
    ENV_PORT, ENV_TOKEN_PEPPER, ENV_WS_PATH,
};
pub use logging::{env_filter, init_logging};
#[cfg(feature = "observability")]
pub use observability::{
    ObservabilityConfig, init_observability_with_config, shutdown_observability,
};
