use std::sync::Arc;

use bartender_cloud::ObjectStorage;
use tokio_util::task::TaskTracker;

use crate::auth::admin_token::JwksCache;
use crate::cache::ResponseCache;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: bartender_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Event bus for order and menu events.
    pub event_bus: Arc<bartender_events::EventBus>,
    /// Cache of public menu responses.
    pub cache: ResponseCache,
    /// Identity provider signing keys for admin tokens.
    pub admin_keys: Arc<JwksCache>,
    /// Drink image storage; `None` when images are not configured.
    pub storage: Option<Arc<dyn ObjectStorage>>,
    /// Image-processing jobs spawned by storage events, drained on shutdown.
    pub jobs: TaskTracker,
}
