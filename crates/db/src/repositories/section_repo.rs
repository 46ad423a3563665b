//! Repository for the `sections` table.

use bartender_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::section::{CreateSection, Section, UpdateSection};

/// Column list for `sections` queries.
const COLUMNS: &str = "id, name, display_order, created_at, updated_at";

/// Outcome of [`SectionRepo::delete_if_empty`].
#[derive(Debug)]
pub enum SectionDeletion {
    NotFound,
    /// Nothing was deleted because drinks still reference the section.
    NotEmpty { section: Section, drink_count: i64 },
    Deleted(Section),
}

/// Provides CRUD operations for menu sections.
pub struct SectionRepo;

impl SectionRepo {
    /// List all sections in menu order.
    pub async fn list(pool: &PgPool) -> Result<Vec<Section>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sections ORDER BY display_order, name");
        sqlx::query_as::<_, Section>(&query).fetch_all(pool).await
    }

    /// Find a section by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Section>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sections WHERE id = $1");
        sqlx::query_as::<_, Section>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether another section already uses `display_order`.
    ///
    /// Pass the section being updated as `excluding` so it does not conflict
    /// with itself.
    pub async fn display_order_taken(
        pool: &PgPool,
        display_order: i32,
        excluding: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS( \
                SELECT 1 FROM sections \
                WHERE display_order = $1 AND ($2::uuid IS NULL OR id <> $2) \
             )",
        )
        .bind(display_order)
        .bind(excluding)
        .fetch_one(pool)
        .await
    }

    /// Insert a new section.
    pub async fn create(pool: &PgPool, input: &CreateSection) -> Result<Section, sqlx::Error> {
        let query = format!(
            "INSERT INTO sections (name, display_order) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Section>(&query)
            .bind(&input.name)
            .bind(input.display_order)
            .fetch_one(pool)
            .await
    }

    /// Apply a partial update. Returns `None` when the section does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSection,
    ) -> Result<Option<Section>, sqlx::Error> {
        let query = format!(
            "UPDATE sections SET \
                name = COALESCE($2, name), \
                display_order = COALESCE($3, display_order) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Section>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.display_order)
            .fetch_optional(pool)
            .await
    }

    /// Number of drinks (active or not) filed under a section.
    pub async fn count_drinks(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM drinks WHERE section_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a section only if no drink (active or not) is filed under it.
    ///
    /// The section row is locked for the check, so a drink inserted
    /// concurrently either lands before the count or fails its foreign key.
    pub async fn delete_if_empty(pool: &PgPool, id: DbId) -> Result<SectionDeletion, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM sections WHERE id = $1 FOR UPDATE");
        let Some(section) = sqlx::query_as::<_, Section>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(SectionDeletion::NotFound);
        };

        let drink_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM drinks WHERE section_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if drink_count > 0 {
            return Ok(SectionDeletion::NotEmpty {
                section,
                drink_count,
            });
        }

        sqlx::query("DELETE FROM sections WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(SectionDeletion::Deleted(section))
    }

    /// Insert `names` as sections numbered 1..n in the given order, within
    /// the caller's transaction. When `clear`, every existing drink and
    /// section is removed first, which cascades to their orders.
    ///
    /// Returns the inserted sections.
    pub async fn seed(
        tx: &mut Transaction<'_, Postgres>,
        names: &[String],
        clear: bool,
    ) -> Result<Vec<Section>, sqlx::Error> {
        if clear {
            sqlx::query("DELETE FROM drinks").execute(&mut **tx).await?;
            sqlx::query("DELETE FROM sections").execute(&mut **tx).await?;
        }

        let query = format!(
            "INSERT INTO sections (name, display_order) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let mut created = Vec::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            let section = sqlx::query_as::<_, Section>(&query)
                .bind(name)
                .bind(idx as i32 + 1)
                .fetch_one(&mut **tx)
                .await?;
            created.push(section);
        }

        Ok(created)
    }
}
