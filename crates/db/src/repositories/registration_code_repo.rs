//! Repository for the `registration_codes` table.

use bartender_core::registration::{CodeStatusFilter, CODE_LIST_LIMIT};
use bartender_core::types::DbId;
use sqlx::PgPool;

use crate::models::registration_code::{CreateRegistrationCode, RegistrationCode};

/// Column list for `registration_codes` queries.
const COLUMNS: &str = "\
    code, created_by, created_at, expires_at, is_used, used_at, used_by_user_key, \
    notes, max_uses, use_count";

/// Provides issuance, listing, and validation of registration codes.
pub struct RegistrationCodeRepo;

impl RegistrationCodeRepo {
    /// Issue a new code.
    pub async fn create(
        pool: &PgPool,
        input: &CreateRegistrationCode,
    ) -> Result<RegistrationCode, sqlx::Error> {
        let query = format!(
            "INSERT INTO registration_codes (created_by, expires_at, max_uses, notes) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RegistrationCode>(&query)
            .bind(&input.created_by)
            .bind(input.expires_at)
            .bind(input.max_uses)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Newest codes first, at most [`CODE_LIST_LIMIT`].
    pub async fn list(
        pool: &PgPool,
        filter: Option<CodeStatusFilter>,
    ) -> Result<Vec<RegistrationCode>, sqlx::Error> {
        let condition = match filter {
            None => "TRUE",
            Some(CodeStatusFilter::Active) => "use_count < max_uses AND expires_at > NOW()",
            Some(CodeStatusFilter::Used) => "use_count >= max_uses",
            Some(CodeStatusFilter::Expired) => "use_count < max_uses AND expires_at <= NOW()",
        };
        let query = format!(
            "SELECT {COLUMNS} FROM registration_codes \
             WHERE {condition} \
             ORDER BY created_at DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, RegistrationCode>(&query)
            .bind(CODE_LIST_LIMIT)
            .fetch_all(pool)
            .await
    }

    /// Find a code by value.
    pub async fn find(pool: &PgPool, code: DbId) -> Result<Option<RegistrationCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM registration_codes WHERE code = $1");
        sqlx::query_as::<_, RegistrationCode>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Find a code only if it still has uses left and has not expired.
    pub async fn find_valid(
        pool: &PgPool,
        code: DbId,
    ) -> Result<Option<RegistrationCode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM registration_codes \
             WHERE code = $1 AND use_count < max_uses AND expires_at > NOW()"
        );
        sqlx::query_as::<_, RegistrationCode>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Delete a code. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, code: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM registration_codes WHERE code = $1")
            .bind(code)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
