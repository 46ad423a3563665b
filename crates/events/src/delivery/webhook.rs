//! Webhook delivery with exponential-backoff-with-jitter retry.
//!
//! [`WebhookDelivery`] POSTs a JSON-encoded [`DomainEvent`] to an external
//! URL. Menu integrations subscribe this way to `DRINK_CREATED`.

use std::time::Duration;

use bartender_core::retry::{RetryDecision, RetryPolicy};

use crate::bus::DomainEvent;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// WebhookDelivery
// ---------------------------------------------------------------------------

/// Delivers domain events to one external webhook endpoint.
pub struct WebhookDelivery {
    client: reqwest::Client,
    url: String,
    policy: RetryPolicy,
}

/// JSON body sent for an event.
pub fn webhook_payload(event: &DomainEvent) -> serde_json::Value {
    serde_json::json!({
        "event_type": event.kind.as_str(),
        "payload": event.payload,
        "timestamp": event.timestamp,
    })
}

impl WebhookDelivery {
    pub fn new(url: impl Into<String>, policy: RetryPolicy) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            policy,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deliver an event, retrying per the configured [`RetryPolicy`].
    ///
    /// Returns the error of the last attempt when every retry fails.
    pub async fn deliver(&self, event: &DomainEvent) -> Result<(), WebhookError> {
        let payload = webhook_payload(event);
        let mut retry_count = 0u32;

        loop {
            let err = match self.try_send(&payload).await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };

            match self.policy.decide(retry_count) {
                RetryDecision::Retry { delay } => {
                    tracing::warn!(
                        attempt = retry_count + 1,
                        url = %self.url,
                        delay_secs = delay.as_secs(),
                        error = %err,
                        "Webhook delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retry_count += 1;
                }
                RetryDecision::DeadLetter => {
                    tracing::error!(
                        url = %self.url,
                        event_type = %event.kind,
                        error = %err,
                        "Webhook delivery failed after all retries"
                    );
                    return Err(err);
                }
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, payload: &serde_json::Value) -> Result<(), WebhookError> {
        let response = self.client.post(&self.url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
