//! Relay of Minecraft traffic into bound Discord channels.

use crate::hashing::short_hash;
use crate::mentions::MentionTranslator;
use crate::render::{self, Notice};
use crate::{PendingProcessor, SinkResolver};
use async_trait::async_trait;
use kavex_core::{ChatFrame, EventFrame, GuildId, Link, ModerationFrame};
use kavex_interface::{BridgeStore, Directory, SinkTransport, WebhookMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A unit of relay work, keyed by the token hash it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// Player chat
    Chat {
        /// Source link hash
        token_hash: String,
        /// Decoded frame
        frame: ChatFrame,
    },
    /// Join / quit / death style event
    PlayerEvent {
        /// Source link hash
        token_hash: String,
        /// Decoded frame
        frame: EventFrame,
    },
    /// In-game moderation action
    Moderation {
        /// Source link hash
        token_hash: String,
        /// Server name at the time of the action
        server_name: String,
        /// Decoded frame
        frame: ModerationFrame,
    },
    /// Connect / disconnect notice
    Notice {
        /// Source link hash
        token_hash: String,
        /// Lifecycle change
        notice: Notice,
    },
}

impl RelayEvent {
    /// Token hash the event fans out from.
    pub fn token_hash(&self) -> &str {
        match self {
            Self::Chat { token_hash, .. }
            | Self::PlayerEvent { token_hash, .. }
            | Self::Moderation { token_hash, .. }
            | Self::Notice { token_hash, .. } => token_hash,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Chat { .. } => "chat",
            Self::PlayerEvent { .. } => "event",
            Self::Moderation { .. } => "moderation",
            Self::Notice { .. } => "notice",
        }
    }
}

/// Fans relay events out to every channel bound to their token hash.
///
/// For each bound channel the message is rendered (chat goes through the
/// [`MentionTranslator`] first), a delivery sink is resolved and the message
/// is posted. A failure for one channel is logged and does not affect the
/// others.
pub struct RelayEngine {
    store: Arc<dyn BridgeStore>,
    transport: Arc<dyn SinkTransport>,
    mentions: MentionTranslator,
    sinks: SinkResolver,
}

impl RelayEngine {
    /// Create an engine over the given collaborators.
    pub fn new(
        store: Arc<dyn BridgeStore>,
        directory: Arc<dyn Directory>,
        transport: Arc<dyn SinkTransport>,
    ) -> Self {
        Self {
            mentions: MentionTranslator::new(Arc::clone(&store), Arc::clone(&directory)),
            sinks: SinkResolver::new(Arc::clone(&store), directory),
            store,
            transport,
        }
    }

    /// Relay one event, returning the number of successful posts.
    #[instrument(skip(self, event), fields(kind = event.kind(), hash = short_hash(event.token_hash())))]
    pub async fn relay(&self, event: &RelayEvent) -> usize {
        if matches!(event, RelayEvent::Chat { frame, .. } if frame.text.trim().is_empty()) {
            debug!("Skipping empty chat line");
            return 0;
        }

        let links = match self.store.links_by_hash(event.token_hash()).await {
            Ok(links) => links,
            Err(e) => {
                warn!(error = %e, "Failed to load bound channels");
                return 0;
            }
        };
        if links.is_empty() {
            debug!("No channels bound to this link");
            return 0;
        }

        let mut translated: HashMap<GuildId, String> = HashMap::new();
        let mut delivered = 0;
        for link in &links {
            let message = self.render(event, link, &mut translated).await;
            if self.deliver(link, &message).await {
                delivered += 1;
            }
        }
        debug!(delivered, bound = links.len(), "Relay complete");
        delivered
    }

    async fn render(
        &self,
        event: &RelayEvent,
        link: &Link,
        translated: &mut HashMap<GuildId, String>,
    ) -> WebhookMessage {
        match event {
            RelayEvent::Chat { frame, .. } => {
                let content = match translated.get(&link.guild_id) {
                    Some(content) => content.clone(),
                    None => {
                        let content = self.mentions.translate(link.guild_id, &frame.text).await;
                        translated.insert(link.guild_id, content.clone());
                        content
                    }
                };
                render::chat_message(frame, content)
            }
            RelayEvent::PlayerEvent { frame, .. } => render::event_message(frame),
            RelayEvent::Moderation {
                server_name, frame, ..
            } => render::moderation_message(server_name, frame),
            RelayEvent::Notice { notice, .. } => render::notice_message(notice),
        }
    }

    async fn deliver(&self, link: &Link, message: &WebhookMessage) -> bool {
        let Some(target) = self.sinks.resolve(link.guild_id, link.channel_id).await else {
            warn!(
                guild_id = %link.guild_id,
                channel_id = %link.channel_id,
                "No delivery sink for bound channel, skipping"
            );
            return false;
        };

        match self.transport.post(&target, message).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    guild_id = %link.guild_id,
                    channel_id = %link.channel_id,
                    error = %e,
                    "Delivery failed"
                );
                false
            }
        }
    }
}

#[async_trait]
impl PendingProcessor<RelayEvent> for RelayEngine {
    async fn process(&self, item: RelayEvent) {
        let delivered = self.relay(&item).await;
        if let RelayEvent::Notice { notice, .. } = &item {
            info!(server = notice.server_name(), delivered, "Posted lifecycle notice");
        }
    }
}
