//! `serve` command handler.

use crate::BridgeConfig;
use anyhow::Context;
use kavex_database::{PostgresBridgeStore, establish_connection, run_migrations};
use kavex_gateway::{Gateway, server};
use kavex_interface::{BridgeStore, SinkTransport};
use kavex_social::{BridgeBot, BridgeHandler, SerenityDirectory, WebhookClient};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Run the gateway and the Discord bot until CTRL+C or until either side stops.
pub async fn run_serve(config: &BridgeConfig) -> anyhow::Result<()> {
    let settings = config.gateway_settings()?;
    let discord_token = config.require_discord_token()?;

    let mut conn = establish_connection(config.require_database_url()?)
        .context("Failed to connect to the database")?;
    let applied = run_migrations(&mut conn)?;
    info!(applied, "Database ready");
    let store: Arc<dyn BridgeStore> = Arc::new(PostgresBridgeStore::new(conn));

    let directory = Arc::new(SerenityDirectory::new());
    let transport = Arc::new(WebhookClient::default());
    let gateway = Arc::new(Gateway::new(
        settings,
        Arc::clone(&store),
        directory.clone(),
        transport.clone(),
    ));

    let handler = BridgeHandler::new(Arc::clone(&gateway), store, directory);
    let mut bot = BridgeBot::new(discord_token, handler).await?;
    let shard_manager = bot.shard_manager();

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    let purge = gateway.spawn_token_purge();

    info!("Kavex running. Press CTRL+C to shutdown.");
    let outcome = tokio::select! {
        result = server::serve(listener, Arc::clone(&gateway), shutdown_signal()) => {
            result.context("Websocket server failed")
        }
        result = bot.start() => {
            match result {
                Ok(()) => {
                    warn!("Discord client stopped");
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        }
    };

    info!("Shutting down");
    shard_manager.shutdown_all().await;
    purge.abort();
    transport.shutdown().await;

    if let Err(e) = &outcome {
        error!(error = %e, "Kavex stopped with an error");
    }
    outcome
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for CTRL+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping gracefully...");
}
