//! Order model, joined read models, and DTOs.

use bartender_core::lenient::true_flag;
use bartender_core::order::OrderStatus;
use bartender_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub drink_id: DbId,
    pub user_key: DbId,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// Flat row produced by joining an order with its drink (and, for the
/// admin queue, the ordering user's name).
#[derive(Debug, Clone, FromRow)]
pub struct OrderDrinkRow {
    pub id: DbId,
    pub drink_id: DbId,
    pub user_key: DbId,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub drink_name: String,
    pub drink_image_url: String,
    pub username: Option<String>,
}

/// The drink fragment embedded in order responses.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDrink {
    pub id: DbId,
    pub name: String,
    pub image_url: String,
}

/// An order as returned by the API: the order plus a drink summary.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithDrink {
    pub id: DbId,
    pub drink_id: DbId,
    pub user_key: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub drink: OrderDrink,
}

impl From<OrderDrinkRow> for OrderWithDrink {
    fn from(row: OrderDrinkRow) -> Self {
        Self {
            id: row.id,
            drink_id: row.drink_id,
            user_key: row.user_key,
            username: row.username,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            completed_at: row.completed_at,
            drink: OrderDrink {
                id: row.drink_id,
                name: row.drink_name,
                image_url: row.drink_image_url,
            },
        }
    }
}

/// Queue counters for the admin order dashboard.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct OrderCounts {
    pub pending_count: i64,
    pub in_progress_count: i64,
    pub completed_24h_count: i64,
}

/// Result of a status change: the updated row and the status it replaced.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub order: Order,
    pub previous_status: OrderStatus,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub drink_id: Option<DbId>,
}

/// Body of `PUT /admin/orders/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: Option<String>,
}

/// Query parameters for `GET /orders`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MyOrdersParams {
    #[serde(default, deserialize_with = "true_flag")]
    pub include_completed: Option<bool>,
}

/// Query parameters for `GET /admin/orders`.
///
/// `pending_limit` is parsed leniently; see
/// [`bartender_core::order::clamp_pending_limit`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminOrdersParams {
    pub pending_limit: Option<String>,
}
