//! Handlers for guest token refresh and logout.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bartender_core::error::CoreError;
use bartender_core::types::Timestamp;
use bartender_db::repositories::{RefreshTokenRepo, UserRepo};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::user_token::{generate_access_token, hash_refresh_token};
use crate::error::{AppError, AppResult, TokenRejection};
use crate::extract::LenientJson;
use crate::middleware::user::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /auth/refresh`.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub access_token_expires_at: Timestamp,
}

/// POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new access token. The refresh token
/// itself is not rotated.
pub async fn refresh(
    State(state): State<AppState>,
    LenientJson(input): LenientJson<RefreshRequest>,
) -> AppResult<impl IntoResponse> {
    let token = input
        .refresh_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CoreError::Validation("refresh_token is required".into()))?;

    let stored = RefreshTokenRepo::find_by_hash(&state.pool, &hash_refresh_token(token))
        .await?
        .ok_or(TokenRejection::Invalid)?;

    if stored.is_revoked {
        return Err(TokenRejection::Revoked.into());
    }
    if stored.expires_at <= Utc::now() {
        return Err(TokenRejection::Expired.into());
    }
    if !stored.user_is_active {
        return Err(TokenRejection::AccountDisabled.into());
    }

    let access = generate_access_token(stored.user_key, &stored.username, &state.config.user_tokens)
        .map_err(|e| AppError::InternalError(format!("Failed to sign access token: {e}")))?;

    RefreshTokenRepo::touch(&state.pool, stored.token_id).await?;
    UserRepo::touch_login(&state.pool, stored.user_key).await?;

    tracing::debug!(user_key = %stored.user_key, "Access token refreshed");

    Ok(Json(DataResponse {
        data: RefreshResponse {
            access_token: access.token,
            access_token_expires_at: access.expires_at,
        },
    }))
}

/// POST /api/v1/auth/logout
///
/// Revokes every refresh token the caller holds.
pub async fn logout(user: AuthUser, State(state): State<AppState>) -> AppResult<StatusCode> {
    let revoked = RefreshTokenRepo::revoke_all_for_user(&state.pool, user.user_key).await?;
    tracing::info!(user_key = %user.user_key, revoked, "Guest logged out");
    Ok(StatusCode::NO_CONTENT)
}
