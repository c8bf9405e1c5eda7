//! Discord chat forwarding into linked Minecraft servers.

use crate::format::{MinecraftFormatter, pinged_names, underline_pings};
use kavex_core::{ChannelId, ChatToGame, GuildId, LinkStatus, UserId};
use kavex_gateway::{Gateway, cosmetics, short_hash};
use kavex_interface::{BridgeStore, Directory};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A Discord message reduced to what forwarding needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordMessage {
    /// Guild the message was posted in, `None` for DMs
    pub guild_id: Option<GuildId>,
    /// Guild display name
    pub guild_name: String,
    /// Channel or thread
    pub channel_id: ChannelId,
    /// Author
    pub author_id: UserId,
    /// Author display name, used when the member is not in the directory
    pub author_name: String,
    /// Posted through a webhook (including our own relays)
    pub from_webhook: bool,
    /// Posted by a bot account
    pub from_bot: bool,
    /// Raw content with `<@id>` style mentions
    pub content: String,
    /// Display names of mentioned users by id
    pub user_mentions: HashMap<u64, String>,
    /// Names of mentioned roles by id
    pub role_mentions: HashMap<u64, String>,
}

/// Forwards Discord chat to the Minecraft server linked to its channel.
pub struct ChatForwarder {
    gateway: Arc<Gateway>,
    store: Arc<dyn BridgeStore>,
    directory: Arc<dyn Directory>,
    formatter: MinecraftFormatter,
}

impl ChatForwarder {
    /// Create a forwarder.
    pub fn new(
        gateway: Arc<Gateway>,
        store: Arc<dyn BridgeStore>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            gateway,
            store,
            directory,
            formatter: MinecraftFormatter::new(),
        }
    }

    /// Forward one message. Returns the number of sockets written to.
    ///
    /// Webhook and bot messages, DMs, and channels without a connected link
    /// are skipped. Linked Minecraft names with pings enabled that the message
    /// mentions are underlined and get a `dc_notify`.
    #[instrument(skip(self, message), fields(channel_id = %message.channel_id))]
    pub async fn forward(&self, message: &DiscordMessage) -> usize {
        if message.from_webhook || message.from_bot {
            return 0;
        }
        let Some(guild_id) = message.guild_id else {
            return 0;
        };
        let channel_id = message.channel_id;

        match self.gateway.link_status(guild_id, channel_id).await {
            Ok(Some(link)) if link.status == LinkStatus::Connected => {
                debug!(hash = short_hash(&link.token_hash), "Forwarding to linked server");
            }
            Ok(_) => return 0,
            Err(e) => {
                warn!(error = %e, "Failed to load channel link");
                return 0;
            }
        }

        let mut text = self
            .formatter
            .to_game_text(&message.content, &message.user_mentions, &message.role_mentions)
            .trim()
            .to_string();
        if text.is_empty() {
            return 0;
        }

        let pinged = self.pinged(guild_id, &message.content).await;
        if !pinged.is_empty() {
            info!(?pinged, "Mention notify triggered");
            text = underline_pings(&text, &pinged);
            for player in &pinged {
                self.gateway.send_notify(guild_id, channel_id, player).await;
            }
        }

        let (user, prefix, color) = match self.directory.member(guild_id, message.author_id).await {
            Ok(Some(member)) => {
                let (prefix, color) = cosmetics(&member.roles);
                (member.display_name().to_string(), prefix, color)
            }
            Ok(None) => (message.author_name.clone(), None, None),
            Err(e) => {
                debug!(error = %e, "Author lookup failed, sending without cosmetics");
                (message.author_name.clone(), None, None)
            }
        };

        let chat = ChatToGame {
            guild: message.guild_name.clone(),
            user,
            text,
            prefix,
            color,
        };
        self.gateway.send_chat(guild_id, channel_id, chat).await
    }

    async fn pinged(&self, guild_id: GuildId, content: &str) -> Vec<String> {
        if !content.contains('@') {
            return Vec::new();
        }
        let links = match self.store.account_links_for_guild(guild_id).await {
            Ok(links) => links,
            Err(e) => {
                warn!(error = %e, "Failed to load account links for pings");
                return Vec::new();
            }
        };
        pinged_names(
            content,
            links
                .iter()
                .filter(|link| link.notify_ping)
                .map(|link| link.mc_name.as_str()),
        )
    }
}
