//! Refresh token models.

use bartender_core::types::{DbId, Timestamp};
use serde_json::Value;
use sqlx::FromRow;

/// A row from the `refresh_tokens` table. Never serialized to clients.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub token_id: DbId,
    pub user_key: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub device_info: Option<Value>,
    pub last_used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A refresh token joined with the owning user's state.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenLookup {
    pub token_id: DbId,
    pub user_key: DbId,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub username: String,
    pub user_is_active: bool,
}

/// Insert DTO.
#[derive(Debug, Clone)]
pub struct CreateRefreshToken {
    pub user_key: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub device_info: Option<Value>,
}
