//! Repository for the `app_users` table, including guest registration.

use bartender_core::types::DbId;
use sqlx::PgPool;

use crate::models::refresh_token::CreateRefreshToken;
use crate::models::user::AppUser;

/// Column list for `app_users` queries.
const COLUMNS: &str = "user_key, username, is_active, last_login, created_at, updated_at";

/// Outcome of [`UserRepo::register`].
#[derive(Debug)]
pub enum RegistrationOutcome {
    /// User created, code consumed, and refresh token stored.
    Registered(AppUser),
    /// Another user already has this username. Nothing was written.
    UsernameTaken,
    /// The registration code was exhausted or expired by the time it was
    /// consumed. Nothing was written.
    CodeUnavailable,
}

/// Provides lookup and registration for app users.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by exact username.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<AppUser>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM app_users WHERE username = $1");
        sqlx::query_as::<_, AppUser>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Register a guest in a single transaction.
    ///
    /// Creates the user, consumes one use of `code` (marking it used once
    /// `max_uses` is reached), and stores the hashed refresh token. The
    /// `user_key` field of `token` is ignored; the new user's key is used.
    pub async fn register(
        pool: &PgPool,
        username: &str,
        code: DbId,
        token: &CreateRefreshToken,
    ) -> Result<RegistrationOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM app_users WHERE username = $1)")
                .bind(username)
                .fetch_one(&mut *tx)
                .await?;
        if taken {
            return Ok(RegistrationOutcome::UsernameTaken);
        }

        let insert_user = format!(
            "INSERT INTO app_users (username, last_login) VALUES ($1, NOW()) RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, AppUser>(&insert_user)
            .bind(username)
            .fetch_one(&mut *tx)
            .await?;

        let consumed = sqlx::query(
            "UPDATE registration_codes SET \
                use_count = use_count + 1, \
                used_at = NOW(), \
                used_by_user_key = $2, \
                is_used = (use_count + 1 >= max_uses) OR is_used \
             WHERE code = $1 AND use_count < max_uses AND expires_at > NOW()",
        )
        .bind(code)
        .bind(user.user_key)
        .execute(&mut *tx)
        .await?;
        if consumed.rows_affected() == 0 {
            return Ok(RegistrationOutcome::CodeUnavailable);
        }

        sqlx::query(
            "INSERT INTO refresh_tokens (user_key, token_hash, expires_at, device_info) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(user.user_key)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .bind(&token.device_info)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(RegistrationOutcome::Registered(user))
    }

    /// Record a successful login (token refresh).
    pub async fn touch_login(pool: &PgPool, user_key: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE app_users SET last_login = NOW() WHERE user_key = $1")
            .bind(user_key)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Enable or disable a user. Returns `false` if the user does not exist.
    pub async fn set_active(pool: &PgPool, user_key: DbId, active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE app_users SET is_active = $2 WHERE user_key = $1")
            .bind(user_key)
            .bind(active)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
