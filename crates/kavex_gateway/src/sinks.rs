//! Delivery sink lookup for linked channels and threads.

use kavex_core::{ChannelId, GuildId};
use kavex_interface::{BridgeStore, Directory, SinkTarget};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Maps a linked channel (or thread) to the endpoint its messages are posted to.
pub struct SinkResolver {
    store: Arc<dyn BridgeStore>,
    directory: Arc<dyn Directory>,
}

impl SinkResolver {
    /// Create a resolver over the given store and directory.
    pub fn new(store: Arc<dyn BridgeStore>, directory: Arc<dyn Directory>) -> Self {
        Self { store, directory }
    }

    /// Resolve the sink for `(guild_id, channel_id)`.
    ///
    /// An exact stored sink wins. Otherwise, if the channel is a thread, the
    /// parent channel's sink is used with the thread id as routing parameter.
    /// Returns `None` when nothing matches or a lookup fails.
    #[instrument(skip(self))]
    pub async fn resolve(&self, guild_id: GuildId, channel_id: ChannelId) -> Option<SinkTarget> {
        match self.store.sink(guild_id, channel_id).await {
            Ok(Some(sink)) => {
                return Some(SinkTarget {
                    endpoint_url: sink.endpoint_url,
                    thread_id: sink.thread_id,
                });
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Failed to load delivery sink");
                return None;
            }
        }

        let info = match self.directory.channel(channel_id).await {
            Ok(Some(info)) => info,
            Ok(None) => return None,
            Err(e) => {
                debug!(error = %e, "Channel lookup failed");
                return None;
            }
        };
        if !info.is_thread {
            return None;
        }
        let parent_id = info.parent_id?;

        match self.store.sink(guild_id, parent_id).await {
            Ok(Some(sink)) => Some(SinkTarget {
                endpoint_url: sink.endpoint_url,
                thread_id: Some(channel_id),
            }),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, parent_id = %parent_id, "Failed to load parent delivery sink");
                None
            }
        }
    }
}
