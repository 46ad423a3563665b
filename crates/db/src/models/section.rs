//! Menu section model and DTOs.

use bartender_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `sections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Section {
    pub id: DbId,
    pub name: String,
    pub display_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Raw admin payload for creating or updating a section.
///
/// `display_order` is kept as raw JSON because clients send it either as a
/// number or as a numeric string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionInput {
    pub name: Option<String>,
    pub display_order: Option<serde_json::Value>,
}

/// Validated insert DTO.
#[derive(Debug, Clone)]
pub struct CreateSection {
    pub name: String,
    pub display_order: i32,
}

/// Validated patch DTO. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateSection {
    pub name: Option<String>,
    pub display_order: Option<i32>,
}

impl UpdateSection {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.display_order.is_none()
    }
}
