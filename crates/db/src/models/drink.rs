//! Drink model, joined read models, and DTOs.

use bartender_core::lenient::{double_option, true_flag};
use bartender_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `drinks` table, including the structured recipe.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Drink {
    pub id: DbId,
    pub section_id: DbId,
    pub name: String,
    pub description: String,
    /// JSON array of ingredient names shown on the menu.
    pub ingredients: Value,
    pub recipe: Option<Value>,
    pub image_url: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Public menu listing entry. The recipe is only served on the detail route.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DrinkSummary {
    pub id: DbId,
    pub section_id: DbId,
    pub name: String,
    pub description: String,
    pub ingredients: Value,
    pub image_url: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Admin listing entry: the full drink plus the name of its section.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DrinkWithSection {
    pub id: DbId,
    pub section_id: DbId,
    pub section_name: String,
    pub name: String,
    pub description: String,
    pub ingredients: Value,
    pub recipe: Option<Value>,
    pub image_url: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Admin payload for creating or updating a drink.
///
/// On update every field is optional; `recipe: null` clears the recipe while
/// an absent `recipe` leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrinkInput {
    pub name: Option<String>,
    pub section_id: Option<DbId>,
    pub description: Option<String>,
    pub ingredients: Option<Value>,
    #[serde(default, deserialize_with = "double_option")]
    pub recipe: Option<Option<Value>>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

/// Validated insert DTO.
#[derive(Debug, Clone)]
pub struct CreateDrink {
    pub section_id: DbId,
    pub name: String,
    pub description: String,
    pub ingredients: Value,
    pub recipe: Option<Value>,
    pub image_url: String,
    pub is_active: bool,
}

impl Drink {
    /// Merge a validated patch into this row, producing the values to store.
    ///
    /// `recipe` is the already-validated replacement (`Some(None)` clears it).
    pub fn merged(&self, input: &DrinkInput, recipe: Option<Option<Value>>) -> CreateDrink {
        CreateDrink {
            section_id: input.section_id.unwrap_or(self.section_id),
            name: input.name.clone().unwrap_or_else(|| self.name.clone()),
            description: input
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            ingredients: input
                .ingredients
                .clone()
                .unwrap_or_else(|| self.ingredients.clone()),
            recipe: recipe.unwrap_or_else(|| self.recipe.clone()),
            image_url: input
                .image_url
                .clone()
                .unwrap_or_else(|| self.image_url.clone()),
            is_active: input.is_active.unwrap_or(self.is_active),
        }
    }
}

/// Query parameters for the public drink listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrinkListParams {
    pub section_id: Option<DbId>,
}

/// Query parameters for the admin drink listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminDrinkListParams {
    pub section_id: Option<DbId>,
    /// Defaults to `true`: admins see inactive drinks unless they opt out.
    #[serde(default, deserialize_with = "true_flag")]
    pub include_inactive: Option<bool>,
}
