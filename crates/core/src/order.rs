//! Order status machine and queue limits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default number of pending orders returned to the bar staff queue.
pub const DEFAULT_PENDING_LIMIT: i64 = 25;

/// Upper bound for the `pending_limit` query parameter.
pub const MAX_PENDING_LIMIT: i64 = 100;

/// Maximum number of orders returned when a user asks for their history.
pub const USER_HISTORY_LIMIT: i64 = 50;

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Pending and in-progress orders block a user from placing another one.
    pub fn is_active(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::InProgress)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
                CoreError::Validation(format!(
                    "Invalid status. Must be one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Interpret the raw `pending_limit` query parameter.
///
/// Missing or non-numeric values fall back to [`DEFAULT_PENDING_LIMIT`];
/// numeric values are capped at [`MAX_PENDING_LIMIT`] and floored at 0.
pub fn clamp_pending_limit(raw: Option<&str>) -> i64 {
    match raw.and_then(|s| s.trim().parse::<i64>().ok()) {
        Some(n) => n.clamp(0, MAX_PENDING_LIMIT),
        None => DEFAULT_PENDING_LIMIT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn stored_text_converts_or_fails() {
        assert_eq!(
            OrderStatus::try_from("cancelled".to_string()).unwrap(),
            OrderStatus::Cancelled
        );
        assert!(OrderStatus::try_from("PENDING".to_string()).is_err());
    }

    #[test]
    fn unknown_status_lists_valid_values() {
        let err = "served".parse::<OrderStatus>().unwrap_err();
        assert!(err.to_string().contains("pending, in_progress, completed, cancelled"));
    }

    #[test]
    fn only_pending_and_in_progress_are_active() {
        assert!(OrderStatus::Pending.is_active());
        assert!(OrderStatus::InProgress.is_active());
        assert!(!OrderStatus::Completed.is_active());
        assert!(!OrderStatus::Cancelled.is_active());
    }

    #[test]
    fn pending_limit_defaults_and_caps() {
        assert_eq!(clamp_pending_limit(None), 25);
        assert_eq!(clamp_pending_limit(Some("abc")), 25);
        assert_eq!(clamp_pending_limit(Some("10")), 10);
        assert_eq!(clamp_pending_limit(Some("500")), 100);
        assert_eq!(clamp_pending_limit(Some("-3")), 0);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&OrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
