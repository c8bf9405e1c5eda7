//! Sink transport that records every post.

use async_trait::async_trait;
use kavex_error::{DeliveryError, DeliveryErrorKind};
use kavex_interface::{DeliveryResult, SinkTarget, SinkTransport, WebhookMessage};
use parking_lot::Mutex;
use std::collections::HashSet;

/// One recorded post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub target: SinkTarget,
    pub message: WebhookMessage,
}

impl Post {
    pub fn content(&self) -> &str {
        self.message.content.as_deref().unwrap_or_default()
    }
}

/// Records posts; endpoints marked failing answer with HTTP 500.
pub struct RecordingTransport {
    posts: Mutex<Vec<Post>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            posts: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_endpoint(&self, url: impl Into<String>) {
        self.failing.lock().insert(url.into());
    }

    pub fn posts(&self) -> Vec<Post> {
        self.posts.lock().clone()
    }

    pub fn contents(&self) -> Vec<String> {
        self.posts
            .lock()
            .iter()
            .map(|post| post.content().to_string())
            .collect()
    }
}

#[async_trait]
impl SinkTransport for RecordingTransport {
    async fn post(&self, target: &SinkTarget, message: &WebhookMessage) -> DeliveryResult<()> {
        if self.failing.lock().contains(&target.endpoint_url) {
            return Err(DeliveryError::new(DeliveryErrorKind::Status {
                status: 500,
                body: "scripted failure".to_string(),
            }));
        }
        self.posts.lock().push(Post {
            target: target.clone(),
            message: message.clone(),
        });
        Ok(())
    }
}
