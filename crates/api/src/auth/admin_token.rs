//! Validation of admin tokens issued by the external identity provider.
//!
//! Tokens are RS256 JWTs whose signing keys are published as a JWKS at
//! `{issuer}/.well-known/jwks.json`. The key set is fetched lazily and kept
//! for the life of the process. A token naming an unknown `kid` triggers a
//! refetch, at most once per [`MIN_REFRESH_INTERVAL`] and never concurrently.

use std::time::{Duration, Instant};

use bartender_core::roles::ROLE_ADMIN;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};

/// Timeout for JWKS fetches.
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimum time between two JWKS fetches.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Issuer and audience rules for admin tokens.
#[derive(Debug, Clone)]
pub struct AdminAuthConfig {
    /// Expected `iss` claim.
    pub issuer: String,
    /// Where the signing keys are published.
    pub jwks_url: String,
    /// Accepted `client_id` (access tokens) or `aud` (ID tokens) values.
    pub allowed_client_ids: Vec<String>,
}

impl AdminAuthConfig {
    /// Load admin token settings from the environment.
    ///
    /// | Env Var               | Default                                                  |
    /// |-----------------------|----------------------------------------------------------|
    /// | `ADMIN_JWT_ISSUER`    | `https://cognito-idp.{AWS_REGION}.amazonaws.com/{USER_POOL_ID}` |
    /// | `ADMIN_JWKS_URL`      | `{issuer}/.well-known/jwks.json`                         |
    /// | `ALLOWED_CLIENT_IDS`  | value of `USER_POOL_CLIENT_ID`                           |
    ///
    /// # Panics
    ///
    /// Panics if neither `ADMIN_JWT_ISSUER` nor `USER_POOL_ID` is set.
    pub fn from_env() -> Self {
        let issuer = std::env::var("ADMIN_JWT_ISSUER").unwrap_or_else(|_| {
            let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".into());
            let pool_id = std::env::var("USER_POOL_ID")
                .expect("ADMIN_JWT_ISSUER or USER_POOL_ID must be set in the environment");
            format!("https://cognito-idp.{region}.amazonaws.com/{pool_id}")
        });
        let issuer = issuer.trim_end_matches('/').to_string();

        let jwks_url = std::env::var("ADMIN_JWKS_URL")
            .unwrap_or_else(|_| format!("{issuer}/.well-known/jwks.json"));

        let allowed_client_ids = std::env::var("ALLOWED_CLIENT_IDS")
            .or_else(|_| std::env::var("USER_POOL_CLIENT_ID"))
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            issuer,
            jwks_url,
            allowed_client_ids,
        }
    }
}

/// Why an admin token was rejected.
#[derive(Debug, thiserror::Error)]
pub enum AdminAuthError {
    #[error("Token missing 'kid' in header")]
    MissingKid,

    #[error("Public key not found for kid: {0}")]
    UnknownKid(String),

    #[error("Failed to fetch signing keys: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Invalid token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid client_id: {0:?} not in allowed clients")]
    ClientNotAllowed(Option<String>),

    #[error("Invalid audience: {0:?} not in allowed clients")]
    AudienceNotAllowed(Vec<String>),
}

/// Claims read from an admin token.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    #[serde(default)]
    pub token_use: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    /// A single string or an array in the token; normalized to a list.
    #[serde(default, deserialize_with = "one_or_many")]
    pub aud: Vec<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "cognito:username")]
    pub username: Option<String>,
    #[serde(default, rename = "cognito:groups")]
    pub groups: Vec<String>,
    #[serde(default, rename = "custom:role")]
    pub custom_role: Option<String>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

impl AdminClaims {
    /// Admin group membership (access tokens) or admin role attribute
    /// (ID tokens).
    pub fn is_admin(&self) -> bool {
        self.groups.iter().any(|g| g == ROLE_ADMIN) || self.custom_role.as_deref() == Some(ROLE_ADMIN)
    }

    /// Best display name for audit fields.
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.sub)
    }
}

/// Process-wide cache of the identity provider's signing keys.
pub struct JwksCache {
    /// `None` for a fixed key set that is never refetched.
    url: Option<String>,
    client: reqwest::Client,
    keys: RwLock<JwkSet>,
    /// When the last fetch started. Held across the fetch so only one runs.
    last_refresh: Mutex<Option<Instant>>,
    min_refresh_interval: Duration,
}

impl JwksCache {
    /// Cache that fetches from `url` on first use.
    pub fn new(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()?;
        Ok(Self {
            url: Some(url.into()),
            client,
            keys: RwLock::new(JwkSet { keys: Vec::new() }),
            last_refresh: Mutex::new(None),
            min_refresh_interval: MIN_REFRESH_INTERVAL,
        })
    }

    /// Override the minimum time between fetches.
    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Cache pinned to `keys`.
    pub fn from_keys(keys: JwkSet) -> Self {
        Self {
            url: None,
            client: reqwest::Client::new(),
            keys: RwLock::new(keys),
            last_refresh: Mutex::new(None),
            min_refresh_interval: MIN_REFRESH_INTERVAL,
        }
    }

    /// Verification key for `kid`.
    ///
    /// On a miss the key set is refetched, unless a fetch started within the
    /// minimum refresh interval. Concurrent misses wait for a single fetch.
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AdminAuthError> {
        if let Some(key) = self.lookup(kid).await? {
            return Ok(key);
        }
        let Some(url) = &self.url else {
            return Err(AdminAuthError::UnknownKid(kid.to_string()));
        };

        let mut last_refresh = self.last_refresh.lock().await;

        // Another request may have refreshed while this one waited.
        if let Some(key) = self.lookup(kid).await? {
            return Ok(key);
        }
        if last_refresh.is_some_and(|at| at.elapsed() < self.min_refresh_interval) {
            tracing::debug!(kid, "Unknown kid, signing keys refreshed recently");
            return Err(AdminAuthError::UnknownKid(kid.to_string()));
        }

        *last_refresh = Some(Instant::now());
        tracing::info!(kid, url = %url, "Fetching identity provider signing keys");
        let fetched: JwkSet = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        *self.keys.write().await = fetched;
        drop(last_refresh);

        self.lookup(kid)
            .await?
            .ok_or_else(|| AdminAuthError::UnknownKid(kid.to_string()))
    }

    async fn lookup(&self, kid: &str) -> Result<Option<DecodingKey>, AdminAuthError> {
        let keys = self.keys.read().await;
        match keys.find(kid) {
            Some(jwk) => Ok(Some(DecodingKey::from_jwk(jwk)?)),
            None => Ok(None),
        }
    }
}

/// Verify an admin token and return its claims.
///
/// Checks signature, expiry, and issuer; then requires an allowed
/// `client_id` for access tokens or an allowed `aud` for any other token.
/// Admin membership is not checked here; see [`AdminClaims::is_admin`].
pub async fn validate_admin_token(
    token: &str,
    config: &AdminAuthConfig,
    keys: &JwksCache,
) -> Result<AdminClaims, AdminAuthError> {
    let header = decode_header(token)?;
    let kid = header.kid.ok_or(AdminAuthError::MissingKid)?;
    let key = keys.decoding_key(&kid).await?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&[config.issuer.as_str()]);
    validation.validate_aud = false;

    let claims = decode::<AdminClaims>(token, &key, &validation)?.claims;

    let allowed = |value: &str| config.allowed_client_ids.iter().any(|c| c == value);

    if claims.token_use.as_deref() == Some("access") {
        if !claims.client_id.as_deref().is_some_and(allowed) {
            return Err(AdminAuthError::ClientNotAllowed(claims.client_id));
        }
    } else if !claims.aud.iter().any(|aud| allowed(aud.as_str())) {
        return Err(AdminAuthError::AudienceNotAllowed(claims.aud));
    }

    Ok(claims)
}
