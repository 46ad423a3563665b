//! Background fan-out from the [`EventBus`](crate::bus::EventBus) to
//! outbound delivery.
//!
//! Order events go to the realtime publisher (user and admin channels);
//! drink events go to the webhook. Delivery failures are logged and never
//! reach the request that produced the event. Deliveries still running when
//! the bus closes are drained before [`EventRelay::run`] returns.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::task::TaskTracker;

use crate::bus::{DomainEvent, EventKind};
use crate::channels::channels_for;
use crate::delivery::realtime::RealtimePublisher;
use crate::delivery::webhook::WebhookDelivery;

/// Default upper bound on waiting for in-flight deliveries at shutdown.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Background service relaying bus events to external endpoints.
pub struct EventRelay {
    realtime: Option<Arc<RealtimePublisher>>,
    webhook: Option<Arc<WebhookDelivery>>,
    deliveries: TaskTracker,
    drain_timeout: Duration,
}

impl EventRelay {
    pub fn new(realtime: Option<RealtimePublisher>, webhook: Option<WebhookDelivery>) -> Self {
        Self {
            realtime: realtime.map(Arc::new),
            webhook: webhook.map(Arc::new),
            deliveries: TaskTracker::new(),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Run the relay loop.
    ///
    /// Exits when the channel is closed (i.e. the bus is dropped), after
    /// waiting up to the drain timeout for deliveries already started.
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        if self.realtime.is_none() {
            tracing::warn!("Realtime events not configured, order updates will not be pushed");
        }
        loop {
            match receiver.recv().await {
                Ok(event) => self.dispatch(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event relay lagged, some events were not delivered");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, relay shutting down");
                    break;
                }
            }
        }

        self.deliveries.close();
        if tokio::time::timeout(self.drain_timeout, self.deliveries.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                pending = self.deliveries.len(),
                "Event deliveries still running at shutdown deadline"
            );
        }
    }

    /// Hand one event to its delivery channels without blocking the loop.
    fn dispatch(&self, event: DomainEvent) {
        if let Some(publisher) = &self.realtime {
            for channel in channels_for(&event) {
                let publisher = Arc::clone(publisher);
                let event = event.clone();
                self.deliveries.spawn(async move {
                    if let Err(e) = publisher.publish(&channel, &event).await {
                        tracing::error!(
                            channel = %channel,
                            event_type = %event.kind,
                            error = %e,
                            "Failed to publish realtime event"
                        );
                    }
                });
            }
        }

        if event.kind == EventKind::DrinkCreated {
            if let Some(webhook) = &self.webhook {
                let webhook = Arc::clone(webhook);
                self.deliveries.spawn(async move {
                    if let Err(e) = webhook.deliver(&event).await {
                        tracing::debug!(
                            url = %webhook.url(),
                            error = %e,
                            "Drink webhook dropped"
                        );
                    }
                });
            }
        }
    }
}
