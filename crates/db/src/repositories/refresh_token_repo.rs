//! Repository for the `refresh_tokens` table.
//!
//! Tokens are looked up by the SHA-256 digest of the plaintext the client
//! presents; the plaintext itself is never stored.

use bartender_core::types::DbId;
use sqlx::PgPool;

use crate::models::refresh_token::{CreateRefreshToken, RefreshToken, RefreshTokenLookup};

/// Column list for `refresh_tokens` queries.
const COLUMNS: &str = "\
    token_id, user_key, token_hash, expires_at, is_revoked, device_info, \
    last_used_at, created_at";

/// Provides storage and revocation of refresh tokens.
pub struct RefreshTokenRepo;

impl RefreshTokenRepo {
    /// Store a new token hash.
    pub async fn create(
        pool: &PgPool,
        input: &CreateRefreshToken,
    ) -> Result<RefreshToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO refresh_tokens (user_key, token_hash, expires_at, device_info) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(input.user_key)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .bind(&input.device_info)
            .fetch_one(pool)
            .await
    }

    /// Look up a token by hash together with its owner's state.
    pub async fn find_by_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenLookup>, sqlx::Error> {
        sqlx::query_as::<_, RefreshTokenLookup>(
            "SELECT t.token_id, t.user_key, t.expires_at, t.is_revoked, \
                    u.username, u.is_active AS user_is_active \
             FROM refresh_tokens t \
             JOIN app_users u ON u.user_key = t.user_key \
             WHERE t.token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await
    }

    /// Mark a token as just used.
    pub async fn touch(pool: &PgPool, token_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE refresh_tokens SET last_used_at = NOW() WHERE token_id = $1")
            .bind(token_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Revoke every active token belonging to a user. Returns the count revoked.
    pub async fn revoke_all_for_user(pool: &PgPool, user_key: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = TRUE \
             WHERE user_key = $1 AND is_revoked = FALSE",
        )
        .bind(user_key)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete tokens, revoked or not, that expired more than a day ago.
    ///
    /// Revoked tokens are kept until then so a refresh attempt still reports
    /// `TOKEN_REVOKED` rather than `INVALID_TOKEN`. Returns the count removed.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < NOW() - INTERVAL '1 day'")
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
