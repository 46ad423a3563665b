//! Registration code model and DTOs.

use bartender_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A row from the `registration_codes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RegistrationCode {
    pub code: DbId,
    pub created_by: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub is_used: bool,
    pub used_at: Option<Timestamp>,
    pub used_by_user_key: Option<DbId>,
    pub notes: Option<String>,
    pub max_uses: i32,
    pub use_count: i32,
}

/// Raw admin payload. Numbers may be sent as numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationCodeInput {
    pub expires_in_hours: Option<Value>,
    pub max_uses: Option<Value>,
    pub notes: Option<String>,
}

/// Validated insert DTO.
#[derive(Debug, Clone)]
pub struct CreateRegistrationCode {
    pub created_by: String,
    pub expires_at: Timestamp,
    pub max_uses: i32,
    pub notes: Option<String>,
}

/// Query parameters for the admin listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationCodeListParams {
    pub status: Option<String>,
}
