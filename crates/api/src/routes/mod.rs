pub mod admin;
pub mod auth;
pub mod drinks;
pub mod health;
pub mod internal;
pub mod orders;
pub mod registration;
pub mod sections;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sections                                 list (public, cached)
///
/// /drinks                                   list (?section_id, public, cached)
/// /drinks/{id}                              get with recipe (public, cached)
///
/// /register                                 register (X-Registration-Code)
///
/// /auth/refresh                             refresh (public)
/// /auth/logout                              logout (requires guest auth)
///
/// /orders                                   list own, place (guest auth)
/// /orders/{id}                              get own order (guest auth)
///
/// /admin/sections                           create (admin only)
/// /admin/sections/{id}                      update, delete
/// /admin/drinks                             list (?section_id, include_inactive), create
/// /admin/drinks/{id}                        update, delete
/// /admin/orders                             queue (?pending_limit)
/// /admin/orders/{id}                        update status (PUT)
/// /admin/registration-codes                 list (?status), create
/// /admin/registration-codes/{code}          delete
/// /admin/images/upload-url                  presigned upload (POST)
///
/// /internal/storage-events                  object-created notifications (signed)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Public menu.
        .nest("/sections", sections::router())
        .nest("/drinks", drinks::router())
        // Guest registration and tokens.
        .merge(registration::router())
        .nest("/auth", auth::router())
        // Guest orders.
        .nest("/orders", orders::router())
        // Menu, queue, and registration-code management.
        .nest("/admin", admin::router())
        // Storage notifications.
        .nest("/internal", internal::router())
}
