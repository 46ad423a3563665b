//! Bartender event bus and outbound event delivery.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`]: the event envelope for order and menu changes.
//! - [`channels`]: realtime channel names each event is pushed to.
//! - [`delivery`]: outbound channels (realtime pub/sub endpoint, webhook).
//! - [`EventRelay`]: background task fanning bus events out to delivery.

pub mod bus;
pub mod channels;
pub mod delivery;
pub mod relay;

pub use bus::{DomainEvent, EventBus, EventKind};
pub use delivery::realtime::{RealtimeConfig, RealtimePublisher};
pub use delivery::webhook::WebhookDelivery;
pub use relay::EventRelay;
