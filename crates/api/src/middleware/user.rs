//! Guest authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bartender_core::error::CoreError;
use bartender_core::types::DbId;

use super::bearer_token;
use crate::auth::user_token::validate_access_token;
use crate::error::AppError;
use crate::state::AppState;

/// Registered guest extracted from a Bearer access token.
///
/// ```ignore
/// async fn my_orders(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_key = %user.user_key, "listing orders");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_key: DbId,
    pub username: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Authentication required".into()))
        })?;

        let claims = validate_access_token(token, &state.config.user_tokens).map_err(|e| {
            tracing::debug!(error = %e, "Rejected guest access token");
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_key: claims.user_key,
            username: claims.username,
        })
    }
}
