use crate::auth::admin_token::AdminAuthConfig;
use crate::auth::user_token::UserTokenConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development except
/// the token key material, which must be provided.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for background tasks to drain after shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Guest-facing frontend, used to build registration links.
    pub frontend_url: String,
    /// Lifetime of cached public menu responses in seconds (default: `300`).
    pub cache_ttl_secs: u64,
    /// Shared secret for `/internal/storage-events` signatures. When unset
    /// the endpoint rejects every request.
    pub storage_events_secret: Option<String>,
    /// Optional webhook notified when a drink is created.
    pub drink_webhook_url: Option<String>,
    /// Guest token key pair and lifetimes.
    pub user_tokens: UserTokenConfig,
    /// Identity provider settings for admin tokens.
    pub admin_auth: AdminAuthConfig,
    /// Drink image storage; `None` disables image endpoints.
    pub images: Option<ImagesConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                       |
    /// | `FRONTEND_URL`          | `http://localhost:5173`    |
    /// | `CACHE_TTL_SECS`        | `300`                      |
    /// | `STORAGE_EVENTS_SECRET` | unset                      |
    /// | `DRINK_WEBHOOK_URL`     | unset                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".into());

        let cache_ttl_secs: u64 = std::env::var("CACHE_TTL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("CACHE_TTL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            frontend_url,
            cache_ttl_secs,
            storage_events_secret: non_empty_var("STORAGE_EVENTS_SECRET"),
            drink_webhook_url: non_empty_var("DRINK_WEBHOOK_URL"),
            user_tokens: UserTokenConfig::from_env(),
            admin_auth: AdminAuthConfig::from_env(),
            images: ImagesConfig::from_env(),
        }
    }
}

/// Where drink images are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    /// In-process store, for local development.
    Memory,
}

/// Drink image storage settings.
#[derive(Debug, Clone)]
pub struct ImagesConfig {
    pub bucket: String,
    pub region: Option<String>,
    /// CDN domain serving optimized images, without scheme.
    pub cdn_domain: Option<String>,
    pub backend: StorageBackend,
}

impl ImagesConfig {
    /// Load image storage settings. Returns `None` when `IMAGES_BUCKET` is unset.
    ///
    /// | Env Var             | Default |
    /// |---------------------|---------|
    /// | `IMAGES_BUCKET`     | unset   |
    /// | `AWS_REGION`        | SDK default chain |
    /// | `IMAGES_CDN_DOMAIN` | unset   |
    /// | `IMAGES_BACKEND`    | `s3` (`s3` or `memory`) |
    pub fn from_env() -> Option<Self> {
        let bucket = non_empty_var("IMAGES_BUCKET")?;
        let backend = match std::env::var("IMAGES_BACKEND").as_deref() {
            Ok("memory") => StorageBackend::Memory,
            Ok("s3") | Err(_) => StorageBackend::S3,
            Ok(other) => panic!("IMAGES_BACKEND must be 's3' or 'memory', got '{other}'"),
        };
        Some(Self {
            bucket,
            region: non_empty_var("AWS_REGION"),
            cdn_domain: non_empty_var("IMAGES_CDN_DOMAIN"),
            backend,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
