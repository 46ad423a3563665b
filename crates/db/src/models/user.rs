//! App user model.
//!
//! App users are bar guests who registered with a registration code. They
//! have no password; they hold a refresh token instead.

use bartender_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `app_users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppUser {
    pub user_key: DbId,
    pub username: String,
    pub is_active: bool,
    pub last_login: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
