use axum::routing::post;
use axum::Router;

use crate::handlers::registration;
use crate::state::AppState;

/// Guest registration, merged at the API root.
///
/// ```text
/// POST /register  -> register (X-Registration-Code)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/register", post(registration::register))
}
