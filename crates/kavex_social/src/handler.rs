//! Serenity event handler wiring Discord into the gateway.

use crate::{ChatForwarder, DiscordMessage, SerenityDirectory};
use kavex_core::{ChannelId, GuildId, UserId};
use kavex_gateway::Gateway;
use kavex_interface::BridgeStore;
use serenity::all::{Message, Ready};
use serenity::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::model::gateway::GatewayIntents;
use serenity::model::id as sid;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Event handler for the bridge bot.
///
/// `cache_ready` attaches the directory and opens the gateway's readiness
/// gate; `message` forwards chat into linked servers.
pub struct BridgeHandler {
    gateway: Arc<Gateway>,
    directory: Arc<SerenityDirectory>,
    forwarder: ChatForwarder,
}

impl BridgeHandler {
    /// Create a handler.
    pub fn new(
        gateway: Arc<Gateway>,
        store: Arc<dyn BridgeStore>,
        directory: Arc<SerenityDirectory>,
    ) -> Self {
        let forwarder = ChatForwarder::new(Arc::clone(&gateway), store, directory.clone());
        Self {
            gateway,
            directory,
            forwarder,
        }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MEMBERS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }

    // Resolve mention names from the cache before any await.
    fn reduce(&self, ctx: &Context, msg: &Message) -> DiscordMessage {
        let guild_id = msg.guild_id.map(|id| GuildId(id.get()));
        let mut user_mentions = HashMap::new();
        let mut role_mentions = HashMap::new();

        match msg.guild_id.and_then(|id| ctx.cache.guild(id)) {
            Some(guild) => {
                for user in &msg.mentions {
                    let name = guild
                        .members
                        .get(&user.id)
                        .and_then(|member| member.nick.clone())
                        .unwrap_or_else(|| user.display_name().to_string());
                    user_mentions.insert(user.id.get(), name);
                }
                for role_id in &msg.mention_roles {
                    if let Some(role) = guild.roles.get(role_id) {
                        role_mentions.insert(role_id.get(), role.name.clone());
                    }
                }
            }
            None => {
                for user in &msg.mentions {
                    user_mentions.insert(user.id.get(), user.display_name().to_string());
                }
            }
        }

        let author_name = msg
            .member
            .as_ref()
            .and_then(|member| member.nick.clone())
            .unwrap_or_else(|| msg.author.display_name().to_string());

        DiscordMessage {
            guild_id,
            guild_name: guild_id
                .and_then(|id| self.directory.guild_name(id))
                .unwrap_or_default(),
            channel_id: ChannelId(msg.channel_id.get()),
            author_id: UserId(msg.author.id.get()),
            author_name,
            from_webhook: msg.webhook_id.is_some(),
            from_bot: msg.author.bot,
            content: msg.content.clone(),
            user_mentions,
            role_mentions,
        }
    }
}

#[async_trait]
impl EventHandler for BridgeHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_user = %ready.user.name,
            guild_count = ready.guilds.len(),
            "Discord bot connected"
        );
    }

    async fn cache_ready(&self, ctx: Context, guilds: Vec<sid::GuildId>) {
        self.directory.attach(ctx.cache.clone(), ctx.http.clone());
        info!(guild_count = guilds.len(), "Discord cache ready");
        self.gateway.mark_ready();
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let message = self.reduce(&ctx, &msg);
        let delivered = self.forwarder.forward(&message).await;
        if delivered > 0 {
            debug!(message_id = %msg.id, delivered, "Forwarded Discord message");
        }
    }
}
