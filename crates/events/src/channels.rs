//! Realtime channel naming.
//!
//! Order events are pushed to the ordering guest's private channel and to
//! the shared bar staff channel. Menu events are not pushed to clients.

use bartender_core::types::DbId;

use crate::bus::DomainEvent;

/// Channel every bar staff client subscribes to.
pub const ADMIN_CHANNEL: &str = "/orders/admin";

/// A guest's private order channel.
pub fn user_channel(user_key: DbId) -> String {
    format!("/orders/user/{user_key}")
}

/// Channels an event should be delivered to, in delivery order.
pub fn channels_for(event: &DomainEvent) -> Vec<String> {
    if !event.kind.is_order_event() {
        return Vec::new();
    }
    let mut channels = Vec::with_capacity(2);
    if let Some(user_key) = event.user_key {
        channels.push(user_channel(user_key));
    }
    channels.push(ADMIN_CHANNEL.to_string());
    channels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventKind;

    #[test]
    fn order_events_go_to_user_and_admin() {
        let user = uuid::Uuid::nil();
        let event = DomainEvent::new(EventKind::OrderStatusChanged).with_user(user);
        assert_eq!(
            channels_for(&event),
            vec![
                "/orders/user/00000000-0000-0000-0000-000000000000".to_string(),
                "/orders/admin".to_string()
            ]
        );
    }

    #[test]
    fn drink_events_have_no_channels() {
        assert!(channels_for(&DomainEvent::new(EventKind::DrinkCreated)).is_empty());
    }
}
