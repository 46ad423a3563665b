//! In-process cache for public menu responses.
//!
//! Menu reads (`/sections`, `/drinks`, `/drinks/{id}`) are served from a
//! `moka` cache with a fixed TTL. Any admin change to sections or drinks, and
//! every finished image-processing run, flushes the whole cache.
//!
//! Entries are keyed by a flush generation, so a load that started before a
//! flush can never repopulate the cache with the data it read.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Upper bound on cached responses.
const MAX_ENTRIES: u64 = 1_000;

/// Shared response cache. Cloning shares the underlying store.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Cache<String, Arc<Value>>,
    generation: Arc<AtomicU64>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(ttl)
                .build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Return the cached body for `key`, or run `load`, cache its serialized
    /// result, and return that. Errors are not cached.
    pub async fn get_or_load<T, F, Fut>(&self, key: String, load: F) -> AppResult<Value>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let generation = self.generation.load(Ordering::Acquire);
        let slot = format!("{generation}:{key}");
        if let Some(hit) = self.inner.get(&slot).await {
            tracing::debug!(cache_key = %key, "Response cache hit");
            return Ok(Value::clone(&hit));
        }

        let value = serde_json::to_value(load().await?)
            .map_err(|e| AppError::InternalError(format!("Failed to serialize response: {e}")))?;
        // A flush during the load makes this slot unreachable.
        if self.generation.load(Ordering::Acquire) == generation {
            self.inner.insert(slot, Arc::new(value.clone())).await;
        }
        Ok(value)
    }

    /// Drop every cached response, including loads still in flight.
    pub fn flush(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.invalidate_all();
        tracing::info!("Response cache flushed");
    }
}
