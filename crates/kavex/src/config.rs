//! Bridge configuration loaded from TOML and the environment.

use derive_getters::Getters;
use kavex_error::{ConfigError, KavexResult};
use kavex_gateway::{GatewaySettings, GatewaySettingsBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Overrides `host`.
pub const ENV_HOST: &str = "MC_WS_HOST";
/// Overrides `port`.
pub const ENV_PORT: &str = "MC_WS_PORT";
/// Overrides `ws_path`.
pub const ENV_WS_PATH: &str = "MC_WS_PATH";
/// Overrides `token_pepper`.
pub const ENV_TOKEN_PEPPER: &str = "MC_TOKEN_PEPPER";
/// Overrides `heartbeat_secs`.
pub const ENV_HEARTBEAT_SECS: &str = "MC_WS_HEARTBEAT_SECS";
/// Overrides `link_token_max_age_secs`.
pub const ENV_LINK_TOKEN_MAX_AGE_SECS: &str = "MC_LINK_TOKEN_MAX_AGE_SECS";
/// Overrides `link_token_purge_secs`.
pub const ENV_LINK_TOKEN_PURGE_SECS: &str = "MC_LINK_TOKEN_PURGE_SECS";
/// Overrides `database_url`.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
/// Overrides `discord_token`.
pub const ENV_DISCORD_TOKEN: &str = "DISCORD_TOKEN";
/// Overrides `log_level`.
pub const ENV_LOG_LEVEL: &str = "RUST_LOG";
/// Overrides `log_json`.
pub const ENV_LOG_JSON: &str = "KAVEX_LOG_JSON";

/// Process configuration for `kavex serve`.
///
/// Every key is optional in the file; missing keys take their defaults.
/// Environment variables win over file values.
///
/// # Examples
///
/// ```
/// use kavex::BridgeConfig;
///
/// let config: BridgeConfig = toml::from_str("port = 9000").unwrap();
/// assert_eq!(*config.port(), 9000);
/// assert_eq!(config.ws_path(), "/mcws");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct BridgeConfig {
    /// Interface the websocket listener binds to
    host: String,
    /// Websocket listener port
    port: u16,
    /// Websocket endpoint path
    ws_path: String,
    /// Secret mixed into every token hash
    token_pepper: String,
    /// Keepalive interval in seconds
    heartbeat_secs: u64,
    /// Maximum age of a link code in seconds
    link_token_max_age_secs: u64,
    /// Seconds between link code purges
    link_token_purge_secs: u64,
    /// PostgreSQL connection string
    database_url: Option<String>,
    /// Discord bot token
    discord_token: Option<String>,
    /// Default log filter when `RUST_LOG` is unset
    log_level: String,
    /// Emit JSON log lines
    log_json: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8765,
            ws_path: "/mcws".to_string(),
            token_pepper: String::new(),
            heartbeat_secs: 20,
            link_token_max_age_secs: 24 * 60 * 60,
            link_token_purge_secs: 60 * 60,
            database_url: None,
            discord_token: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> KavexResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> KavexResult<Self> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)).into())
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> KavexResult<Self> {
        Self::default().with_env()
    }

    /// Optional file, then the process environment on top.
    pub fn load(path: Option<&Path>) -> KavexResult<Self> {
        match path {
            Some(path) => Self::from_file(path)?.with_env(),
            None => Self::from_env(),
        }
    }

    /// Apply overrides from the process environment.
    pub fn with_env(self) -> KavexResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps an environment variable
    /// name to its value.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the variable when a numeric or
    /// boolean value does not parse.
    pub fn with_overrides<F>(mut self, lookup: F) -> KavexResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_HOST) {
            self.host = value;
        }
        if let Some(value) = lookup(ENV_PORT) {
            self.port = parse_var(ENV_PORT, &value)?;
        }
        if let Some(value) = lookup(ENV_WS_PATH) {
            self.ws_path = value;
        }
        if let Some(value) = lookup(ENV_TOKEN_PEPPER) {
            self.token_pepper = value;
        }
        if let Some(value) = lookup(ENV_HEARTBEAT_SECS) {
            self.heartbeat_secs = parse_var(ENV_HEARTBEAT_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_LINK_TOKEN_MAX_AGE_SECS) {
            self.link_token_max_age_secs = parse_var(ENV_LINK_TOKEN_MAX_AGE_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_LINK_TOKEN_PURGE_SECS) {
            self.link_token_purge_secs = parse_var(ENV_LINK_TOKEN_PURGE_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_DATABASE_URL) {
            self.database_url = Some(value);
        }
        if let Some(value) = lookup(ENV_DISCORD_TOKEN) {
            self.discord_token = Some(value);
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = lookup(ENV_LOG_JSON) {
            self.log_json = parse_flag(ENV_LOG_JSON, &value)?;
        }
        Ok(self)
    }

    /// `host:port` for the websocket listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Database URL, required to serve or migrate.
    pub fn require_database_url(&self) -> KavexResult<&str> {
        required(self.database_url.as_deref(), ENV_DATABASE_URL)
    }

    /// Discord token, required to serve.
    pub fn require_discord_token(&self) -> KavexResult<&str> {
        required(self.discord_token.as_deref(), ENV_DISCORD_TOKEN)
    }

    /// Gateway settings derived from this configuration.
    pub fn gateway_settings(&self) -> KavexResult<GatewaySettings> {
        if !self.ws_path.starts_with('/') {
            return Err(ConfigError::new(format!(
                "ws_path must start with '/': {}",
                self.ws_path
            ))
            .into());
        }
        if self.heartbeat_secs == 0 {
            return Err(ConfigError::new("heartbeat_secs must be positive").into());
        }
        GatewaySettingsBuilder::default()
            .token_pepper(self.token_pepper.clone())
            .ws_path(self.ws_path.clone())
            .heartbeat(Duration::from_secs(self.heartbeat_secs))
            .link_token_max_age(Duration::from_secs(self.link_token_max_age_secs))
            .link_token_purge_interval(Duration::from_secs(self.link_token_purge_secs))
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid gateway settings: {}", e)).into())
    }
}

fn parse_var<T>(name: &str, value: &str) -> KavexResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::new(format!("{} is invalid ({:?}): {}", name, value, e)).into())
}

fn parse_flag(name: &str, value: &str) -> KavexResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::new(format!("{} is not a boolean: {:?}", name, value)).into()),
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> KavexResult<&'a str> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::new(format!("{} is not set", name)).into()),
    }
}
