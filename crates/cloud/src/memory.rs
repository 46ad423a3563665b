//! In-process [`ObjectStorage`] used by tests and local development.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{DeleteReport, ObjectStorage, StorageError};

/// An object held by [`MemoryStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
    pub cache_control: Option<String>,
}

/// Object storage backed by an in-memory map.
pub struct MemoryStorage {
    bucket: String,
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    /// Inspect a stored object, including its metadata.
    pub async fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    /// All keys currently stored, sorted.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        cache_control: Option<&str>,
    ) -> Result<(), StorageError> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                cache_control: cache_control.map(str::to_string),
            },
        );
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.body.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .objects
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete_objects(&self, keys: &[String]) -> Result<DeleteReport, StorageError> {
        let mut objects = self.objects.write().await;
        for key in keys {
            objects.remove(key);
        }
        Ok(DeleteReport {
            deleted: keys.to_vec(),
            failed: Vec::new(),
        })
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        if expires_in.is_zero() {
            return Err(StorageError::InvalidRequest("expiry must be positive".into()));
        }
        Ok(format!(
            "memory://{}/{key}?content-type={content_type}&expires={}",
            self.bucket,
            expires_in.as_secs()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_and_list_by_prefix() {
        let storage = MemoryStorage::new("test-bucket");
        storage
            .put_object("a/1", b"one".to_vec(), "text/plain", Some("no-cache"))
            .await
            .unwrap();
        storage
            .put_object("b/2", b"two".to_vec(), "text/plain", None)
            .await
            .unwrap();

        assert_eq!(storage.get_object("a/1").await.unwrap(), b"one");
        assert_eq!(storage.list_keys("a/").await.unwrap(), vec!["a/1".to_string()]);
        assert_eq!(
            storage.object("a/1").await.unwrap().cache_control.as_deref(),
            Some("no-cache")
        );
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let storage = MemoryStorage::new("test-bucket");
        assert!(matches!(
            storage.get_object("nope").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn presign_rejects_zero_expiry() {
        let storage = MemoryStorage::new("test-bucket");
        assert!(storage
            .presign_put("k", "image/png", Duration::ZERO)
            .await
            .is_err());
        let url = storage
            .presign_put("k", "image/png", Duration::from_secs(300))
            .await
            .unwrap();
        assert!(url.contains("expires=300"));
    }
}
