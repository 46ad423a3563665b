use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bartender_cloud::{MemoryStorage, ObjectStorage, S3Storage};
use bartender_core::retry::RetryPolicy;
use bartender_events::{EventBus, EventRelay, RealtimeConfig, RealtimePublisher, WebhookDelivery};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bartender_api::auth::admin_token::JwksCache;
use bartender_api::background::token_cleanup;
use bartender_api::cache::ResponseCache;
use bartender_api::config::{ImagesConfig, ServerConfig, StorageBackend};
use bartender_api::router::build_app_router;
use bartender_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bartender_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = bartender_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    bartender_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    bartender_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Admin identity provider keys ---
    let admin_keys = Arc::new(
        JwksCache::new(config.admin_auth.jwks_url.clone())
            .expect("Failed to build JWKS HTTP client"),
    );

    // --- Image storage ---
    let storage = match &config.images {
        Some(images) => Some(build_storage(images).await),
        None => {
            tracing::warn!("IMAGES_BUCKET not set, image endpoints disabled");
            None
        }
    };

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    let realtime = RealtimeConfig::from_env().map(|rc| {
        RealtimePublisher::new(rc).expect("Failed to build realtime HTTP client")
    });
    if realtime.is_none() {
        tracing::warn!("Realtime endpoint not configured, order events stay in-process");
    }
    let webhook = config.drink_webhook_url.as_ref().map(|url| {
        WebhookDelivery::new(url.clone(), RetryPolicy::default())
            .expect("Failed to build webhook HTTP client")
    });
    let relay = EventRelay::new(realtime, webhook)
        .with_drain_timeout(Duration::from_secs(config.shutdown_timeout_secs));
    let relay_handle = tokio::spawn(relay.run(event_bus.subscribe()));
    tracing::info!("Event relay started");

    // --- Scheduled jobs ---
    let cleanup_cancel = CancellationToken::new();
    let cleanup_handle = tokio::spawn(token_cleanup::run(pool.clone(), cleanup_cancel.clone()));

    // --- App state ---
    let jobs = TaskTracker::new();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        cache: ResponseCache::new(Duration::from_secs(config.cache_ttl_secs)),
        admin_keys,
        storage,
        jobs: jobs.clone(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    jobs.close();
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, jobs.wait()).await.is_err() {
        tracing::warn!(
            pending = jobs.len(),
            "Image jobs still running at shutdown deadline"
        );
    }

    cleanup_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), cleanup_handle).await;

    // Dropping the last sender closes the broadcast channel; the relay then
    // drains in-flight deliveries within its own deadline.
    drop(event_bus);
    let _ = tokio::time::timeout(drain + Duration::from_secs(5), relay_handle).await;
    tracing::info!("Event relay shut down");

    tracing::info!("Graceful shutdown complete");
}

async fn build_storage(images: &ImagesConfig) -> Arc<dyn ObjectStorage> {
    match images.backend {
        StorageBackend::S3 => {
            tracing::info!(bucket = %images.bucket, "Using S3 image storage");
            Arc::new(S3Storage::from_env(images.bucket.clone(), images.region.clone()).await)
        }
        StorageBackend::Memory => {
            tracing::warn!(bucket = %images.bucket, "Using in-memory image storage");
            Arc::new(MemoryStorage::new(images.bucket.clone()))
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
