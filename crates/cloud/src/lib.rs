//! Object storage for drink images.
//!
//! [`ObjectStorage`] is the seam between the service and its object store.
//! [`S3Storage`] talks to S3; [`MemoryStorage`] keeps objects in process for
//! tests and local development.

pub mod cleanup;
pub mod error;
pub mod memory;
pub mod s3;

use std::time::Duration;

use async_trait::async_trait;

pub use cleanup::delete_drink_images;
pub use error::StorageError;
pub use memory::MemoryStorage;
pub use s3::S3Storage;

/// Result of a batch delete: keys removed and keys that failed with a reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Minimal object-store operations the service relies on.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Bucket (or namespace) objects are stored in.
    fn bucket(&self) -> &str;

    /// Store `body` under `key`.
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        cache_control: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Fetch the bytes stored under `key`.
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Every key starting with `prefix`.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Delete `keys`. Missing keys count as deleted.
    async fn delete_objects(&self, keys: &[String]) -> Result<DeleteReport, StorageError>;

    /// A URL the client can `PUT` `content_type` bytes to until `expires_in`
    /// elapses.
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;

    /// Public URL of `key`, through `cdn_domain` when one is configured.
    fn public_url(&self, key: &str, cdn_domain: Option<&str>) -> String {
        bartender_core::images::public_url(key, self.bucket(), cdn_domain)
    }
}
