//! Administrator authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bartender_core::error::CoreError;

use super::bearer_token;
use crate::auth::admin_token::validate_admin_token;
use crate::error::AppError;
use crate::state::AppState;

/// Administrator identity taken from a validated identity-provider token.
#[derive(Debug, Clone)]
pub struct AdminUser {
    /// Subject claim.
    pub sub: String,
    /// Username, email, or subject, for audit fields.
    pub display_name: String,
}

/// Requires a valid identity-provider token with the admin role.
///
/// Missing or invalid tokens are rejected with 401, valid tokens without the
/// admin role with 403.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AdminUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })?;

        let claims = validate_admin_token(token, &state.config.admin_auth, &state.admin_keys)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected admin token");
                AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
            })?;

        if !claims.is_admin() {
            tracing::warn!(sub = %claims.sub, "User lacks admin role");
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }

        Ok(RequireAdmin(AdminUser {
            display_name: claims.display_name().to_string(),
            sub: claims.sub,
        }))
    }
}
