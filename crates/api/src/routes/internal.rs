//! Route definitions for service-to-service callbacks.

use axum::routing::post;
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// Routes mounted at `/internal`. Requests are authenticated by signature,
/// not by bearer token.
///
/// ```text
/// POST /storage-events  -> storage_events
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/storage-events", post(images::storage_events))
}
