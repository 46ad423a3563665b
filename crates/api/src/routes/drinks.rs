//! Route definitions for the public `/drinks` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::drinks;
use crate::state::AppState;

/// Routes mounted at `/drinks`.
///
/// ```text
/// GET /      -> list_drinks
/// GET /{id}  -> get_drink
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(drinks::list_drinks))
        .route("/{id}", get(drinks::get_drink))
}
