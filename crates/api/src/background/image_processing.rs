//! Background processing of uploaded drink images.
//!
//! A storage event for `original/{drink_id}/...` becomes an [`ImageJob`]:
//! the pipeline renders every variant, then the drink's `image_url` is
//! pointed at the medium variant and the menu cache is flushed.

use std::time::Duration;

use bartender_core::retry::{linear_delay, RetryDecision, RetryPolicy};
use bartender_core::types::DbId;
use bartender_db::repositories::DrinkRepo;
use bartender_pipeline::{ImageProcessor, PipelineError};
use sqlx::PgPool;

use crate::cache::ResponseCache;
use crate::state::AppState;

/// Attempts at writing the new image URL onto the drink.
const URL_UPDATE_ATTEMPTS: u32 = 3;

/// Base of the linear delay between URL update attempts.
const URL_UPDATE_BASE_DELAY: Duration = Duration::from_secs(2);

/// How an image job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Variants rendered and the drink now points at `image_url`.
    Completed { drink_id: DbId, image_url: String },
    /// The upload can never be processed (bad key or unusable image).
    Rejected,
    /// Retries were exhausted.
    DeadLettered,
    /// Variants rendered, but the drink row could not be updated.
    DrinkNotUpdated { drink_id: DbId },
}

/// One run of the image pipeline for an uploaded object.
pub struct ImageJob {
    processor: ImageProcessor,
    pool: PgPool,
    cache: ResponseCache,
    policy: RetryPolicy,
    url_retry_base: Duration,
}

impl ImageJob {
    pub fn new(processor: ImageProcessor, pool: PgPool, cache: ResponseCache) -> Self {
        Self {
            processor,
            pool,
            cache,
            policy: RetryPolicy::default(),
            url_retry_base: URL_UPDATE_BASE_DELAY,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_url_retry_base(mut self, base: Duration) -> Self {
        self.url_retry_base = base;
        self
    }

    /// Process `key`, retrying transient failures with backoff.
    pub async fn run(self, key: String) -> JobOutcome {
        let mut retry_count = 0;

        let images = loop {
            match self.processor.process(&key).await {
                Ok(images) => break images,
                Err(e) if !e.is_retryable() => {
                    log_rejection(&key, &e);
                    return JobOutcome::Rejected;
                }
                Err(e) => match self.policy.decide(retry_count) {
                    RetryDecision::Retry { delay } => {
                        tracing::warn!(
                            key = %key,
                            error = %e,
                            retry_count,
                            delay_secs = delay.as_secs(),
                            "Image processing failed, retrying",
                        );
                        tokio::time::sleep(delay).await;
                        retry_count += 1;
                    }
                    RetryDecision::DeadLetter => {
                        tracing::error!(
                            key = %key,
                            error = %e,
                            retry_count,
                            "Image processing dead-lettered",
                        );
                        return JobOutcome::DeadLettered;
                    }
                },
            }
        };

        let drink_id = images.drink_id;
        let Some(image_url) = images.primary_url().map(str::to_string) else {
            tracing::error!(%drink_id, "Pipeline produced no medium variant");
            return JobOutcome::DrinkNotUpdated { drink_id };
        };

        for attempt in 1..=URL_UPDATE_ATTEMPTS {
            match DrinkRepo::set_image_url(&self.pool, drink_id, &image_url).await {
                Ok(true) => {
                    self.cache.flush();
                    tracing::info!(%drink_id, image_url = %image_url, "Drink image updated");
                    return JobOutcome::Completed {
                        drink_id,
                        image_url,
                    };
                }
                Ok(false) => {
                    tracing::warn!(%drink_id, attempt, "Drink not found for image update");
                }
                Err(e) => {
                    tracing::warn!(%drink_id, attempt, error = %e, "Drink image update failed");
                }
            }
            if attempt < URL_UPDATE_ATTEMPTS {
                tokio::time::sleep(linear_delay(self.url_retry_base, attempt)).await;
            }
        }

        tracing::error!(
            %drink_id,
            attempts = URL_UPDATE_ATTEMPTS,
            "Gave up updating drink image URL",
        );
        JobOutcome::DrinkNotUpdated { drink_id }
    }
}

fn log_rejection(key: &str, error: &PipelineError) {
    match error {
        PipelineError::InvalidKey(_) => {
            tracing::info!(key, "Ignoring object outside the upload prefix");
        }
        _ => tracing::error!(key, error = %error, "Image rejected"),
    }
}

/// Spawn an [`ImageJob`] for `key` onto the state's job tracker.
///
/// Returns `false` when image storage is not configured.
pub fn spawn(state: &AppState, key: String) -> bool {
    let Some(storage) = state.storage.clone() else {
        return false;
    };
    let cdn_domain = state
        .config
        .images
        .as_ref()
        .and_then(|images| images.cdn_domain.clone());

    let job = ImageJob::new(
        ImageProcessor::new(storage, cdn_domain),
        state.pool.clone(),
        state.cache.clone(),
    );
    state.jobs.spawn(job.run(key));
    true
}
