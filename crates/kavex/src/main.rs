//! Kavex CLI binary.
//!
//! - `serve` runs the websocket gateway and the Discord bot
//! - `migrate` applies database migrations
//! - `hash-token` prints the hash a link token is stored under

use clap::Parser;
use kavex::{BridgeConfig, Cli, Commands, run_migrate, run_serve};
use kavex_gateway::hash_token;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = BridgeConfig::load(cli.config.as_deref())?;

    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.log_level().clone()
    };

    #[cfg(feature = "observability")]
    let provider = kavex::init_observability_with_config(
        kavex::ObservabilityConfig::default()
            .with_log_level(log_level)
            .with_json_logs(*config.log_json()),
    )?;
    #[cfg(not(feature = "observability"))]
    kavex::init_logging(&log_level, *config.log_json())?;

    let result = match cli.command {
        Commands::Serve => run_serve(&config).await,
        Commands::Migrate => run_migrate(&config)
            .map(|applied| println!("Applied {} migration(s)", applied))
            .map_err(Into::into),
        Commands::HashToken { token } => {
            println!("{}", hash_token(&token, config.token_pepper()));
            Ok(())
        }
    };

    #[cfg(feature = "observability")]
    kavex::shutdown_observability(provider);

    result
}
