//! Outbound delivery channels for domain events.

pub mod realtime;
pub mod webhook;
