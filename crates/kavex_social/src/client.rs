//! Discord bot client setup and lifecycle management.

use crate::{BridgeHandler, DiscordError, DiscordErrorKind, DiscordResult};
use serenity::Client;
use serenity::gateway::ShardManager;
use std::sync::Arc;
use tracing::{info, instrument};

/// Discord bot client for the bridge.
pub struct BridgeBot {
    client: Client,
}

impl BridgeBot {
    /// Build the serenity client.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the client fails to build.
    #[instrument(skip(token, handler), fields(token_len = token.len()))]
    pub async fn new(token: &str, handler: BridgeHandler) -> DiscordResult<Self> {
        if token.trim().is_empty() {
            return Err(DiscordError::new(DiscordErrorKind::MissingToken));
        }

        let intents = BridgeHandler::intents();
        info!("Building Serenity client with intents: {:?}", intents);

        let client = Client::builder(token.trim(), intents)
            .event_handler(handler)
            .await
            .map_err(|e| {
                DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                    "Failed to build client: {}",
                    e
                )))
            })?;

        Ok(Self { client })
    }

    /// Shard manager, for shutting the connection down from another task.
    pub fn shard_manager(&self) -> Arc<ShardManager> {
        Arc::clone(&self.client.shard_manager)
    }

    /// Run the bot until its shards stop.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> DiscordResult<()> {
        info!("Starting Discord bot");
        self.client.start().await.map_err(|e| {
            DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                "Client error: {}",
                e
            )))
        })
    }
}
