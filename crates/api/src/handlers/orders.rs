//! Handlers for orders: guests placing and tracking orders, bar staff
//! working the queue.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bartender_core::error::CoreError;
use bartender_core::order::{clamp_pending_limit, OrderStatus};
use bartender_core::types::DbId;
use bartender_db::models::order::{
    AdminOrdersParams, CreateOrderRequest, MyOrdersParams, OrderCounts, StatusChange,
    UpdateOrderStatusRequest,
};
use bartender_db::repositories::{DrinkRepo, OrderRepo};
use bartender_events::{DomainEvent, EventKind};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::extract::LenientJson;
use crate::middleware::admin::RequireAdmin;
use crate::middleware::user::AuthUser;
use crate::response::{DataResponse, DataWithMetadata};
use crate::state::AppState;

/// Queue counters plus how many pending orders this response holds.
#[derive(Debug, Serialize)]
pub struct QueueMetadata {
    #[serde(flatten)]
    pub counts: OrderCounts,
    pub pending_returned: usize,
}

/// Conflict message when an admin update would give a guest two active orders.
pub const GUEST_HAS_ACTIVE_ORDER: &str = "This guest already has another active order";

// ---------------------------------------------------------------------------
// Guest
// ---------------------------------------------------------------------------

/// POST /api/v1/orders
///
/// Places an order for an active drink. A guest may hold one active order
/// at a time. Publishes `ORDER_CREATED`.
pub async fn create_order(
    user: AuthUser,
    State(state): State<AppState>,
    LenientJson(input): LenientJson<CreateOrderRequest>,
) -> AppResult<impl IntoResponse> {
    let drink_id = input
        .drink_id
        .ok_or_else(|| CoreError::Validation("drink_id is required".into()))?;

    DrinkRepo::find_active(&state.pool, drink_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Drink",
            id: drink_id,
        })?;

    if OrderRepo::find_active_for_user(&state.pool, user.user_key)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict("You already have an active order".into()).into());
    }

    let created = OrderRepo::create(&state.pool, drink_id, user.user_key).await?;
    let order = OrderRepo::find_with_drink(&state.pool, created.id)
        .await?
        .ok_or_else(|| AppError::InternalError("Created order could not be read back".into()))?;

    state.event_bus.publish(
        DomainEvent::new(EventKind::OrderCreated)
            .with_user(user.user_key)
            .with_payload(to_payload(&order)),
    );
    tracing::info!(
        order_id = %order.id,
        drink_id = %drink_id,
        user_key = %user.user_key,
        "Order created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: order })))
}

/// GET /api/v1/orders?include_completed=
///
/// The caller's active orders, or their recent history with
/// `include_completed=true`.
pub async fn list_my_orders(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<MyOrdersParams>,
) -> AppResult<impl IntoResponse> {
    let orders = OrderRepo::list_for_user(
        &state.pool,
        user.user_key,
        params.include_completed.unwrap_or(false),
    )
    .await?;

    Ok(Json(DataResponse { data: orders }))
}

/// GET /api/v1/orders/{id}
pub async fn get_order(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let order = OrderRepo::find_with_drink(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Order",
            id,
        })?;

    if order.user_key != user.user_key {
        return Err(CoreError::Forbidden(
            "You do not have permission to view this order".into(),
        )
        .into());
    }

    Ok(Json(DataResponse { data: order }))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/orders?pending_limit=
///
/// Every in-progress order (oldest first) followed by up to `pending_limit`
/// pending orders (oldest first), with queue counters.
pub async fn list_orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AdminOrdersParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_pending_limit(params.pending_limit.as_deref());

    let (in_progress, pending, counts) = tokio::try_join!(
        OrderRepo::list_in_progress(&state.pool),
        OrderRepo::list_pending(&state.pool, limit),
        OrderRepo::counts(&state.pool),
    )?;

    let pending_returned = pending.len();
    let mut orders = in_progress;
    orders.extend(pending);

    Ok(Json(DataWithMetadata {
        data: orders,
        metadata: QueueMetadata {
            counts,
            pending_returned,
        },
    }))
}

/// PUT /api/v1/admin/orders/{id}
///
/// Moves an order to a new status and publishes `ORDER_COMPLETED` or
/// `ORDER_STATUS_CHANGED`.
pub async fn update_order_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    LenientJson(input): LenientJson<UpdateOrderStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let status: OrderStatus = input
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::Validation("status is required".into()))?
        .parse()?;

    let change = OrderRepo::update_status(&state.pool, id, status)
        .await
        .map_err(admin_status_conflict)?
        .ok_or(CoreError::NotFound {
            entity: "Order",
            id,
        })?;

    state.event_bus.publish(status_event(&change));
    tracing::info!(
        order_id = %id,
        from = %change.previous_status,
        to = %status,
        admin = %admin.display_name,
        "Order status updated",
    );

    Ok(Json(DataResponse { data: change.order }))
}

/// Reactivating an order for a guest who already has an active one trips the
/// one-active-order index; report that in the admin's terms.
fn admin_status_conflict(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err)
            if db_err.constraint() == Some("uq_orders_active_per_user") =>
        {
            CoreError::Conflict(GUEST_HAS_ACTIVE_ORDER.into()).into()
        }
        _ => err.into(),
    }
}

/// The event announcing a status change.
fn status_event(change: &StatusChange) -> DomainEvent {
    let kind = if change.order.status == OrderStatus::Completed {
        EventKind::OrderCompleted
    } else {
        EventKind::OrderStatusChanged
    };

    let mut payload = to_payload(&change.order);
    if let Value::Object(map) = &mut payload {
        map.insert("previous_status".into(), json!(change.previous_status));
    }

    DomainEvent::new(kind)
        .with_user(change.order.user_key)
        .with_payload(payload)
}

fn to_payload<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
