//! Webhook delivery over a shared, lazily created HTTP client.

use async_trait::async_trait;
use kavex_error::{DeliveryError, DeliveryErrorKind};
use kavex_interface::{DeliveryResult, SinkTarget, SinkTransport, WebhookMessage};
use parking_lot::Mutex;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Default timeout for a single webhook post.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts relayed messages to Discord webhooks.
///
/// One pooled [`Client`] is created on first use and dropped by
/// [`SinkTransport::shutdown`]; a post after shutdown creates a fresh one.
#[derive(Debug)]
pub struct WebhookClient {
    client: Mutex<Option<Client>>,
    timeout: Duration,
}

impl Default for WebhookClient {
    fn default() -> Self {
        Self::new(DEFAULT_WEBHOOK_TIMEOUT)
    }
}

impl WebhookClient {
    /// Create a transport with the given per-request timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Mutex::new(None),
            timeout,
        }
    }

    /// Whether the pooled client currently exists.
    pub fn is_open(&self) -> bool {
        self.client.lock().is_some()
    }

    fn client(&self) -> DeliveryResult<Client> {
        let mut slot = self.client.lock();
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| DeliveryError::new(DeliveryErrorKind::Transport(e.to_string())))?;
        debug!("Created webhook HTTP client");
        *slot = Some(client.clone());
        Ok(client)
    }
}

#[async_trait]
impl SinkTransport for WebhookClient {
    #[instrument(skip(self, target, message), fields(thread_id = ?target.thread_id))]
    async fn post(&self, target: &SinkTarget, message: &WebhookMessage) -> DeliveryResult<()> {
        let client = self.client()?;
        let mut request = client.post(&target.endpoint_url).json(message);
        if let Some(thread_id) = target.thread_id {
            request = request.query(&[("thread_id", thread_id.get())]);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = ?e, "Webhook request failed");
            DeliveryError::new(DeliveryErrorKind::Transport(e.to_string()))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Webhook returned error");
            return Err(DeliveryError::new(DeliveryErrorKind::Status {
                status: status.as_u16(),
                body,
            }));
        }
        Ok(())
    }

    async fn shutdown(&self) {
        if self.client.lock().take().is_some() {
            debug!("Closed webhook HTTP client");
        }
    }
}
