//! Realtime pub/sub delivery.
//!
//! [`RealtimePublisher`] pushes events to a managed pub/sub HTTP endpoint
//! (`POST {endpoint}/event`, authenticated with an `x-api-key` header).
//! Each message carries one channel and a list of JSON-encoded events:
//!
//! ```json
//! { "channel": "/orders/admin", "events": ["{\"type\":\"ORDER_CREATED\",\"data\":{...}}"] }
//! ```

use std::time::Duration;

use serde_json::json;

use crate::bus::DomainEvent;

/// HTTP request timeout for a single publish.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Error type for realtime publish failures.
#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint returned a non-2xx status code.
    #[error("Realtime endpoint returned HTTP {0}")]
    HttpStatus(u16),
}

/// Connection settings for the realtime endpoint.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Host name or URL of the endpoint. `https://` is assumed when no
    /// scheme is given.
    pub endpoint: String,
    pub api_key: String,
}

impl RealtimeConfig {
    /// Load from `REALTIME_EVENTS_ENDPOINT` and `REALTIME_EVENTS_API_KEY`.
    ///
    /// Returns `None` unless both are set and non-empty.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("REALTIME_EVENTS_ENDPOINT").ok()?;
        let api_key = std::env::var("REALTIME_EVENTS_API_KEY").ok()?;
        if endpoint.trim().is_empty() || api_key.trim().is_empty() {
            return None;
        }
        Some(Self { endpoint, api_key })
    }

    /// Full publish URL.
    pub fn publish_url(&self) -> String {
        let endpoint = self.endpoint.trim().trim_end_matches('/');
        if endpoint.contains("://") {
            format!("{endpoint}/event")
        } else {
            format!("https://{endpoint}/event")
        }
    }
}

/// Request body for publishing `event` to `channel`.
pub fn publish_body(channel: &str, event: &DomainEvent) -> serde_json::Value {
    let message = json!({
        "type": event.kind.as_str(),
        "data": event.payload,
    });
    json!({
        "channel": channel,
        "events": [message.to_string()],
    })
}

/// Publishes events to realtime channels.
pub struct RealtimePublisher {
    client: reqwest::Client,
    config: RealtimeConfig,
}

impl RealtimePublisher {
    pub fn new(config: RealtimeConfig) -> Result<Self, RealtimeError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// Publish one event to one channel.
    pub async fn publish(&self, channel: &str, event: &DomainEvent) -> Result<(), RealtimeError> {
        let response = self
            .client
            .post(self.config.publish_url())
            .header("x-api-key", &self.config.api_key)
            .json(&publish_body(channel, event))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RealtimeError::HttpStatus(response.status().as_u16()));
        }
        tracing::debug!(channel, event_type = %event.kind, "Realtime event published");
        Ok(())
    }
}
