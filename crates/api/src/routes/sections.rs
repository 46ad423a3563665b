//! Route definitions for the public `/sections` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::sections;
use crate::state::AppState;

/// Routes mounted at `/sections`.
///
/// ```text
/// GET /  -> list_sections
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(sections::list_sections))
}
