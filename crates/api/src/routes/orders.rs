//! Route definitions for the guest `/orders` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::orders;
use crate::state::AppState;

/// Routes mounted at `/orders`. All require a guest access token.
///
/// ```text
/// GET  /      -> list_my_orders
/// POST /      -> create_order
/// GET  /{id}  -> get_order
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list_my_orders).post(orders::create_order))
        .route("/{id}", get(orders::get_order))
}
