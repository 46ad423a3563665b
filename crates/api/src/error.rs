use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bartender_cloud::StorageError;
use bartender_core::error::CoreError;
use serde_json::json;

/// Reasons a refresh token cannot be exchanged for an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    #[error("Invalid refresh token")]
    Invalid,
    #[error("Refresh token has expired")]
    Expired,
    #[error("Refresh token has been revoked")]
    Revoked,
    #[error("User account is disabled")]
    AccountDisabled,
}

impl TokenRejection {
    fn status_and_code(self) -> (StatusCode, &'static str) {
        match self {
            TokenRejection::Invalid => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            TokenRejection::Expired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            TokenRejection::Revoked => (StatusCode::FORBIDDEN, "TOKEN_REVOKED"),
            TokenRejection::AccountDisabled => (StatusCode::FORBIDDEN, "ACCOUNT_DISABLED"),
        }
    }
}

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `bartender_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An object storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A refresh token that cannot be used.
    #[error(transparent)]
    Token(#[from] TokenRejection),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut extra = serde_json::Map::new();

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::SectionNotEmpty {
                    section_name,
                    drink_count,
                } => {
                    extra.insert("section_name".into(), json!(section_name));
                    extra.insert("drink_count".into(), json!(drink_count));
                    (
                        StatusCode::CONFLICT,
                        "SECTION_NOT_EMPTY",
                        format!(
                            "Cannot delete section '{section_name}': it contains {drink_count} drink(s)"
                        ),
                    )
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Storage errors ---
            AppError::Storage(err) => match err {
                StorageError::NotFound(key) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Object {key} not found"),
                ),
                StorageError::InvalidRequest(msg) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
                }
                StorageError::Backend(msg) => {
                    tracing::error!(error = %msg, "Object storage error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Refresh token rejections ---
            AppError::Token(rejection) => {
                let (status, code) = rejection.status_and_code();
                (status, code, rejection.to_string())
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let mut body = serde_json::Map::new();
        body.insert("error".into(), json!(message));
        body.insert("code".into(), json!(code));
        body.extend(extra);

        (status, axum::Json(serde_json::Value::Object(body))).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        conflict_message(constraint),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Human-readable message for the unique constraints the schema defines.
fn conflict_message(constraint: &str) -> String {
    match constraint {
        "uq_sections_display_order" => "A section with this display order already exists".into(),
        "uq_app_users_username" => "Username already exists".into(),
        "uq_orders_active_per_user" => "You already have an active order".into(),
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn section_not_empty_carries_details() {
        let (status, body) = body_of(AppError::Core(CoreError::SectionNotEmpty {
            section_name: "Classics".into(),
            drink_count: 3,
        }))
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["drink_count"], 3);
        assert_eq!(body["section_name"], "Classics");
        assert_eq!(body["code"], "SECTION_NOT_EMPTY");
    }

    #[tokio::test]
    async fn token_rejections_map_to_codes() {
        let (status, body) = body_of(TokenRejection::Revoked.into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "TOKEN_REVOKED");

        let (status, body) = body_of(TokenRejection::Expired.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "TOKEN_EXPIRED");
    }

    #[tokio::test]
    async fn internal_errors_are_sanitized() {
        let (status, body) = body_of(AppError::InternalError("secret detail".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal error occurred");
    }
}
