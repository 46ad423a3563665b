//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`DomainEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use std::fmt;

use bartender_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// Kind of domain event. Serialized in `SCREAMING_SNAKE_CASE`, which is also
/// the `type` field clients see on realtime channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    OrderCreated,
    OrderStatusChanged,
    OrderCompleted,
    DrinkCreated,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::OrderCreated => "ORDER_CREATED",
            EventKind::OrderStatusChanged => "ORDER_STATUS_CHANGED",
            EventKind::OrderCompleted => "ORDER_COMPLETED",
            EventKind::DrinkCreated => "DRINK_CREATED",
        }
    }

    pub fn is_order_event(self) -> bool {
        !matches!(self, EventKind::DrinkCreated)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A domain event that occurred in the service.
///
/// Constructed via [`DomainEvent::new`] and enriched with
/// [`with_user`](DomainEvent::with_user) and
/// [`with_payload`](DomainEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub kind: EventKind,

    /// The guest the event concerns, if any. Order events carry the
    /// ordering user so they can be pushed to that user's channel.
    pub user_key: Option<DbId>,

    /// Event-specific JSON data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: Timestamp,
}

impl DomainEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            user_key: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_user(mut self, user_key: DbId) -> Self {
        self.user_key = Some(user_key);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use bartender_events::bus::{DomainEvent, EventBus, EventKind};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(DomainEvent::new(EventKind::DrinkCreated));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: DomainEvent) {
        // SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
