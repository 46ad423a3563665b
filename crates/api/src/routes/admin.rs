//! Route definitions for the `/admin` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{drinks, images, orders, registration, sections};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// POST   /sections                   -> create_section
/// PUT    /sections/{id}              -> update_section
/// DELETE /sections/{id}              -> delete_section
/// GET    /drinks                     -> list_drinks_admin
/// POST   /drinks                     -> create_drink
/// PUT    /drinks/{id}                -> update_drink
/// DELETE /drinks/{id}                -> delete_drink
/// GET    /orders                     -> list_orders
/// PUT    /orders/{id}                -> update_order_status
/// GET    /registration-codes         -> list_codes
/// POST   /registration-codes         -> create_code
/// DELETE /registration-codes/{code}  -> delete_code
/// POST   /images/upload-url          -> create_upload_url
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sections", post(sections::create_section))
        .route(
            "/sections/{id}",
            put(sections::update_section).delete(sections::delete_section),
        )
        .route(
            "/drinks",
            get(drinks::list_drinks_admin).post(drinks::create_drink),
        )
        .route(
            "/drinks/{id}",
            put(drinks::update_drink).delete(drinks::delete_drink),
        )
        .route("/orders", get(orders::list_orders))
        .route("/orders/{id}", put(orders::update_order_status))
        .route(
            "/registration-codes",
            get(registration::list_codes).post(registration::create_code),
        )
        .route(
            "/registration-codes/{code}",
            axum::routing::delete(registration::delete_code),
        )
        .route("/images/upload-url", post(images::create_upload_url))
}
