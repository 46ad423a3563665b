#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use bartender_cloud::{MemoryStorage, ObjectStorage};
use bartender_core::types::DbId;
use http_body_util::BodyExt;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use sqlx::PgPool;
use tokio_util::task::TaskTracker;
use tower::ServiceExt;

use bartender_api::auth::admin_token::{AdminAuthConfig, JwksCache};
use bartender_api::auth::signature::{sign, SIGNATURE_HEADER};
use bartender_api::auth::user_token::{generate_access_token, UserTokenConfig};
use bartender_api::cache::ResponseCache;
use bartender_api::config::{ImagesConfig, ServerConfig, StorageBackend};
use bartender_api::router::build_app_router;
use bartender_api::state::AppState;

pub const ADMIN_ISSUER: &str = "https://idp.test/pool";
pub const ADMIN_CLIENT: &str = "bartender-admin";
pub const ADMIN_KID: &str = "test-admin-key";
pub const IMAGES_BUCKET: &str = "bartender-images";
pub const CDN_DOMAIN: &str = "cdn.test";
pub const STORAGE_EVENTS_SECRET: &str = "test-storage-secret";

/// Build a test `ServerConfig` with safe defaults.
///
/// Guest tokens use the fixture key pair; admin tokens are expected from
/// [`ADMIN_ISSUER`] and images live in an in-memory bucket.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        frontend_url: "https://bar.test".to_string(),
        cache_ttl_secs: 300,
        storage_events_secret: Some(STORAGE_EVENTS_SECRET.to_string()),
        drink_webhook_url: None,
        user_tokens: UserTokenConfig::from_pem(
            include_str!("../fixtures/user_private.pem"),
            include_str!("../fixtures/user_public.pem"),
            4,
            7,
        )
        .unwrap(),
        admin_auth: AdminAuthConfig {
            issuer: ADMIN_ISSUER.to_string(),
            jwks_url: format!("{ADMIN_ISSUER}/.well-known/jwks.json"),
            allowed_client_ids: vec![ADMIN_CLIENT.to_string()],
        },
        images: Some(ImagesConfig {
            bucket: IMAGES_BUCKET.to_string(),
            region: None,
            cdn_domain: Some(CDN_DOMAIN.to_string()),
            backend: StorageBackend::Memory,
        }),
    }
}

/// A test application plus handles on the state behind it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub storage: Arc<MemoryStorage>,
}

/// Build the full application with the production middleware stack, an
/// in-memory image bucket, and the fixture admin signing keys.
pub fn spawn_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let keys: JwkSet = serde_json::from_str(include_str!("../fixtures/admin_jwks.json"))
        .expect("fixture JWKS should parse");
    let storage = Arc::new(MemoryStorage::new(IMAGES_BUCKET));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(bartender_events::EventBus::default()),
        cache: ResponseCache::new(std::time::Duration::from_secs(config.cache_ttl_secs)),
        admin_keys: Arc::new(JwksCache::from_keys(keys)),
        storage: Some(storage.clone() as Arc<dyn ObjectStorage>),
        jobs: TaskTracker::new(),
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        storage,
    }
}

/// Build the application router for tests that only speak HTTP.
pub fn build_test_app(pool: PgPool) -> Router {
    spawn_app(pool).router
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

fn sign_admin_claims(claims: Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(ADMIN_KID.to_string());
    let key = EncodingKey::from_rsa_pem(include_bytes!("../fixtures/admin_private.pem"))
        .expect("fixture admin key should parse");
    encode(&header, &claims, &key).expect("admin token should sign")
}

fn admin_claims(groups: &[&str]) -> Value {
    json!({
        "sub": "admin-sub",
        "iss": ADMIN_ISSUER,
        "token_use": "access",
        "client_id": ADMIN_CLIENT,
        "cognito:username": "barkeep",
        "cognito:groups": groups,
        "exp": chrono::Utc::now().timestamp() + 600,
    })
}

/// An access token for an administrator.
pub fn admin_token() -> String {
    sign_admin_claims(admin_claims(&["admin"]))
}

/// A valid identity-provider token without the admin role.
pub fn staff_token() -> String {
    sign_admin_claims(admin_claims(&["staff"]))
}

/// A guest access token for `user_key`.
pub fn user_token(user_key: DbId, username: &str) -> String {
    generate_access_token(user_key, username, &test_config().user_tokens)
        .expect("guest token should sign")
        .token
}

/// Signature header value for a storage-event body.
pub fn storage_signature(body: &[u8]) -> String {
    sign(STORAGE_EVENTS_SECRET, body)
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Send a request through the router.
pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request should build")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, request("GET", uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request("GET", uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, request("POST", uri, None, Some(body))).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, request("POST", uri, Some(token), Some(body))).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, request("PUT", uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request("DELETE", uri, Some(token), None)).await
}
