//! Tests for configuration loading and environment overrides.

use kavex::{BridgeConfig, ENV_DATABASE_URL, ENV_HEARTBEAT_SECS, ENV_LOG_JSON, ENV_PORT};
use kavex::{ENV_DISCORD_TOKEN, ENV_TOKEN_PEPPER, ENV_WS_PATH};
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = BridgeConfig::default();
    assert_eq!(config.bind_address(), "0.0.0.0:8765");
    assert_eq!(config.ws_path(), "/mcws");
    assert_eq!(*config.heartbeat_secs(), 20);
    assert_eq!(*config.link_token_max_age_secs(), 86_400);
    assert_eq!(*config.link_token_purge_secs(), 3_600);
    assert_eq!(config.log_level(), "info");
    assert!(!*config.log_json());
    assert!(config.database_url().is_none());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = BridgeConfig::from_toml(
        r#"
        port = 9000
        token_pepper = "s3cret"
        database_url = "postgres://localhost/kavex"
        "#,
    )
    .expect("valid toml");

    assert_eq!(*config.port(), 9000);
    assert_eq!(config.token_pepper(), "s3cret");
    assert_eq!(config.host(), "0.0.0.0");
    assert_eq!(
        config.require_database_url().expect("url set"),
        "postgres://localhost/kavex"
    );
}

#[test]
fn test_invalid_toml_is_config_error() {
    let err = BridgeConfig::from_toml("port = \"many\"").expect_err("port must be numeric");
    assert!(err.to_string().contains("Failed to parse config"));
}

#[test]
fn test_from_file() {
    let dir = std::env::temp_dir().join(format!("kavex-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("kavex.toml");
    let mut file = std::fs::File::create(&path).expect("create file");
    writeln!(file, "ws_path = \"/bridge\"\nlog_json = true").expect("write file");

    let config = BridgeConfig::from_file(&path).expect("load file");
    assert_eq!(config.ws_path(), "/bridge");
    assert!(*config.log_json());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_missing_file_is_config_error() {
    let err = BridgeConfig::from_file("/definitely/not/here/kavex.toml")
        .expect_err("missing file");
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_environment_overrides_file_values() {
    let config = BridgeConfig::from_toml("port = 9000\nws_path = \"/file\"")
        .expect("valid toml")
        .with_overrides(lookup(&[
            (ENV_PORT, "9100"),
            (ENV_WS_PATH, "/env"),
            (ENV_HEARTBEAT_SECS, " 5 "),
            (ENV_LOG_JSON, "TRUE"),
            (ENV_DATABASE_URL, "postgres://db/kavex"),
        ]))
        .expect("valid overrides");

    assert_eq!(*config.port(), 9100);
    assert_eq!(config.ws_path(), "/env");
    assert_eq!(*config.heartbeat_secs(), 5);
    assert!(*config.log_json());
    assert_eq!(config.database_url().as_deref(), Some("postgres://db/kavex"));
}

#[test]
fn test_unparsable_override_names_the_variable() {
    let err = BridgeConfig::default()
        .with_overrides(lookup(&[(ENV_PORT, "eighty")]))
        .expect_err("port must parse");
    assert!(err.to_string().contains(ENV_PORT));

    let err = BridgeConfig::default()
        .with_overrides(lookup(&[(ENV_LOG_JSON, "maybe")]))
        .expect_err("flag must parse");
    assert!(err.to_string().contains(ENV_LOG_JSON));
}

#[test]
fn test_required_values() {
    let config = BridgeConfig::default();
    let err = config.require_discord_token().expect_err("token unset");
    assert!(err.to_string().contains(ENV_DISCORD_TOKEN));

    let config = BridgeConfig::default()
        .with_overrides(lookup(&[(ENV_DISCORD_TOKEN, "   ")]))
        .expect("valid overrides");
    assert!(config.require_discord_token().is_err());

    let config = BridgeConfig::default()
        .with_overrides(lookup(&[(ENV_DISCORD_TOKEN, " abc ")]))
        .expect("valid overrides");
    assert_eq!(config.require_discord_token().expect("token set"), "abc");
}

#[test]
fn test_gateway_settings() {
    let settings = BridgeConfig::default()
        .with_overrides(lookup(&[
            (ENV_TOKEN_PEPPER, "pepper"),
            (ENV_HEARTBEAT_SECS, "7"),
        ]))
        .expect("valid overrides")
        .gateway_settings()
        .expect("valid settings");

    assert_eq!(settings.token_pepper(), "pepper");
    assert_eq!(settings.ws_path(), "/mcws");
    assert_eq!(*settings.heartbeat(), Duration::from_secs(7));
    assert_eq!(*settings.link_token_max_age(), Duration::from_secs(86_400));
    assert_eq!(
        *settings.link_token_purge_interval(),
        Duration::from_secs(3_600)
    );
}

#[test]
fn test_gateway_settings_rejects_bad_values() {
    let relative = BridgeConfig::from_toml("ws_path = \"mcws\"").expect("valid toml");
    assert!(relative.gateway_settings().is_err());

    let no_heartbeat = BridgeConfig::from_toml("heartbeat_secs = 0").expect("valid toml");
    assert!(no_heartbeat.gateway_settings().is_err());
}
