//! Repository for the `drinks` table.

use bartender_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::drink::{CreateDrink, Drink, DrinkSummary, DrinkWithSection};

/// Column list for full `drinks` rows.
const COLUMNS: &str = "\
    id, section_id, name, description, ingredients, recipe, image_url, \
    is_active, created_at, updated_at";

/// Column list for the public listing (no recipe).
const SUMMARY_COLUMNS: &str = "\
    id, section_id, name, description, ingredients, image_url, \
    is_active, created_at, updated_at";

/// Provides CRUD operations for drinks.
pub struct DrinkRepo;

impl DrinkRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Active drinks ordered by name, optionally limited to one section.
    pub async fn list_active(
        pool: &PgPool,
        section_id: Option<DbId>,
    ) -> Result<Vec<DrinkSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM drinks \
             WHERE is_active AND ($1::uuid IS NULL OR section_id = $1) \
             ORDER BY name"
        );
        sqlx::query_as::<_, DrinkSummary>(&query)
            .bind(section_id)
            .fetch_all(pool)
            .await
    }

    /// Admin listing joined with the section name, in menu order.
    pub async fn list_admin(
        pool: &PgPool,
        section_id: Option<DbId>,
        include_inactive: bool,
    ) -> Result<Vec<DrinkWithSection>, sqlx::Error> {
        sqlx::query_as::<_, DrinkWithSection>(
            "SELECT d.id, d.section_id, s.name AS section_name, d.name, d.description, \
                    d.ingredients, d.recipe, d.image_url, d.is_active, \
                    d.created_at, d.updated_at \
             FROM drinks d \
             JOIN sections s ON s.id = d.section_id \
             WHERE ($1::uuid IS NULL OR d.section_id = $1) \
               AND ($2 OR d.is_active) \
             ORDER BY s.display_order, d.name",
        )
        .bind(section_id)
        .bind(include_inactive)
        .fetch_all(pool)
        .await
    }

    /// Find a drink by ID regardless of its active flag.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Drink>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM drinks WHERE id = $1");
        sqlx::query_as::<_, Drink>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a drink by ID only if it is active.
    pub async fn find_active(pool: &PgPool, id: DbId) -> Result<Option<Drink>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM drinks WHERE id = $1 AND is_active");
        sqlx::query_as::<_, Drink>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Total number of drinks.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM drinks")
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a new drink.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateDrink,
    ) -> Result<Drink, sqlx::Error> {
        let query = format!(
            "INSERT INTO drinks \
                (section_id, name, description, ingredients, recipe, image_url, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Drink>(&query)
            .bind(input.section_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.ingredients)
            .bind(&input.recipe)
            .bind(&input.image_url)
            .bind(input.is_active)
            .fetch_one(executor)
            .await
    }

    /// Overwrite every mutable column. Returns `None` if the drink is gone.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &CreateDrink,
    ) -> Result<Option<Drink>, sqlx::Error> {
        let query = format!(
            "UPDATE drinks SET \
                section_id = $2, name = $3, description = $4, ingredients = $5, \
                recipe = $6, image_url = $7, is_active = $8 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Drink>(&query)
            .bind(id)
            .bind(input.section_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.ingredients)
            .bind(&input.recipe)
            .bind(&input.image_url)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Point a drink at a new image. Returns `false` if the drink does not exist.
    pub async fn set_image_url(pool: &PgPool, id: DbId, url: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE drinks SET image_url = $2 WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a drink, returning the removed row.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Drink>, sqlx::Error> {
        let query = format!("DELETE FROM drinks WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Drink>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
