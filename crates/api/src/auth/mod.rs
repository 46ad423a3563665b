//! Authentication primitives.
//!
//! - [`user_token`] -- RS256 access tokens and opaque refresh tokens for guests.
//! - [`admin_token`] -- validation of identity-provider tokens against a JWKS.
//! - [`signature`] -- HMAC verification of internal storage notifications.

pub mod admin_token;
pub mod signature;
pub mod user_token;
