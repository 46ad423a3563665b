//! Periodic purge of refresh tokens more than a day past expiry.
//!
//! Revoked tokens go with the rest once they expire.

use std::time::Duration;

use bartender_db::repositories::RefreshTokenRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Run the refresh-token cleanup loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Refresh token cleanup job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Refresh token cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                match RefreshTokenRepo::cleanup_expired(&pool).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Refresh token cleanup: purged tokens");
                    }
                    Ok(_) => tracing::debug!("Refresh token cleanup: nothing to purge"),
                    Err(e) => {
                        tracing::error!(error = %e, "Refresh token cleanup failed");
                    }
                }
            }
        }
    }
}
