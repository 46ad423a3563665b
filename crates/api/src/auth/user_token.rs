//! Guest access tokens and refresh-token helpers.
//!
//! Access tokens are RS256-signed JWTs carrying a [`UserClaims`] payload and
//! signed with the service's own key pair. Refresh tokens are opaque random
//! strings; only their SHA-256 hash is stored server-side.

use std::fmt;

use bartender_core::types::{DbId, Timestamp};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Value of the `token_type` claim on access tokens.
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// Random bytes in a refresh token (256 bits).
const REFRESH_TOKEN_BYTES: usize = 32;

/// Default access token lifetime in hours.
const DEFAULT_ACCESS_EXPIRY_HOURS: i64 = 4;
/// Default refresh token lifetime in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

/// Claims embedded in every guest access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub token_type: String,
    pub username: String,
    pub user_key: DbId,
    pub iat: i64,
    pub exp: i64,
}

/// Parsed key pair and lifetimes for guest tokens.
#[derive(Clone)]
pub struct UserTokenConfig {
    /// RSA private key used to sign access tokens.
    encoding_key: EncodingKey,
    /// RSA public key used to verify access tokens.
    decoding_key: DecodingKey,
    pub access_token_expiry_hours: i64,
    pub refresh_token_expiry_days: i64,
}

impl fmt::Debug for UserTokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserTokenConfig")
            .field("encoding_key", &"<redacted>")
            .field("access_token_expiry_hours", &self.access_token_expiry_hours)
            .field("refresh_token_expiry_days", &self.refresh_token_expiry_days)
            .finish()
    }
}

impl UserTokenConfig {
    /// Parse a PEM key pair once, up front.
    pub fn from_pem(
        private_key_pem: &str,
        public_key_pem: &str,
        access_token_expiry_hours: i64,
        refresh_token_expiry_days: i64,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self {
            encoding_key: EncodingKey::from_rsa_pem(private_key_pem.as_bytes())?,
            decoding_key: DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?,
            access_token_expiry_hours,
            refresh_token_expiry_days,
        })
    }

    /// Load the key pair and lifetimes from the environment.
    ///
    /// Each key is read from `<VAR>` (inline PEM) or, if unset, from the file
    /// named by `<VAR>_FILE`.
    ///
    /// | Env Var                         | Required | Default |
    /// |---------------------------------|----------|---------|
    /// | `USER_JWT_PRIVATE_KEY[_FILE]`   | **yes**  | --      |
    /// | `USER_JWT_PUBLIC_KEY[_FILE]`    | **yes**  | --      |
    /// | `USER_ACCESS_EXPIRY_HOURS`      | no       | `4`     |
    /// | `USER_REFRESH_EXPIRY_DAYS`      | no       | `7`     |
    ///
    /// # Panics
    ///
    /// Panics if a key is missing, unreadable, or not a valid RSA PEM.
    pub fn from_env() -> Self {
        let private_key_pem = read_pem("USER_JWT_PRIVATE_KEY");
        let public_key_pem = read_pem("USER_JWT_PUBLIC_KEY");

        let access_token_expiry_hours: i64 = std::env::var("USER_ACCESS_EXPIRY_HOURS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_HOURS.to_string())
            .parse()
            .expect("USER_ACCESS_EXPIRY_HOURS must be a valid i64");

        let refresh_token_expiry_days: i64 = std::env::var("USER_REFRESH_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("USER_REFRESH_EXPIRY_DAYS must be a valid i64");

        Self::from_pem(
            &private_key_pem,
            &public_key_pem,
            access_token_expiry_hours,
            refresh_token_expiry_days,
        )
        .expect("USER_JWT_PRIVATE_KEY and USER_JWT_PUBLIC_KEY must be RSA PEM keys")
    }

    /// When a refresh token issued now expires.
    pub fn refresh_token_expires_at(&self) -> Timestamp {
        Utc::now() + Duration::days(self.refresh_token_expiry_days)
    }
}

fn read_pem(var: &str) -> String {
    if let Ok(pem) = std::env::var(var) {
        assert!(!pem.trim().is_empty(), "{var} must not be empty");
        return pem.replace("\\n", "\n");
    }
    let path = std::env::var(format!("{var}_FILE"))
        .unwrap_or_else(|_| panic!("{var} or {var}_FILE must be set in the environment"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path}: {e}"))
}

/// A signed access token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub expires_at: Timestamp,
}

/// Sign an access token for the given user.
pub fn generate_access_token(
    user_key: DbId,
    username: &str,
    config: &UserTokenConfig,
) -> Result<IssuedAccessToken, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.access_token_expiry_hours);

    let claims = UserClaims {
        token_type: ACCESS_TOKEN_TYPE.to_string(),
        username: username.to_string(),
        user_key,
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(&Header::new(Algorithm::RS256), &claims, &config.encoding_key)?;
    Ok(IssuedAccessToken { token, expires_at })
}

/// Verify an access token's signature and expiry and return its claims.
///
/// Tokens whose `token_type` is not `access` are rejected.
pub fn validate_access_token(
    token: &str,
    config: &UserTokenConfig,
) -> Result<UserClaims, jsonwebtoken::errors::Error> {
    let data = decode::<UserClaims>(
        token,
        &config.decoding_key,
        &Validation::new(Algorithm::RS256),
    )?;
    if data.claims.token_type != ACCESS_TOKEN_TYPE {
        return Err(ErrorKind::InvalidToken.into());
    }
    Ok(data.claims)
}

/// Generate a 256-bit URL-safe refresh token.
///
/// Returns `(plaintext_token, sha256_hex_hash)`. Only the hash is persisted.
pub fn generate_refresh_token() -> (String, String) {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    let plaintext = URL_SAFE_NO_PAD.encode(bytes);
    let hash = hash_refresh_token(&plaintext);
    (plaintext, hash)
}

/// SHA-256 hex digest of a refresh token.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
