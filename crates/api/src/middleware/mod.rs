//! Authentication extractors.
//!
//! - [`user::AuthUser`] -- a registered guest, from a service-issued access token.
//! - [`admin::RequireAdmin`] -- an administrator, from an identity-provider token.
//! - [`registration::ValidRegistrationCode`] -- a usable `X-Registration-Code`.

pub mod admin;
pub mod registration;
pub mod user;

/// Extract the token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(parts: &axum::http::request::Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
