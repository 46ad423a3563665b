//! S3-backed [`ObjectStorage`].

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client as S3Client;

use crate::{DeleteReport, ObjectStorage, StorageError};

/// S3 caps a `DeleteObjects` request at 1000 keys.
const DELETE_BATCH: usize = 1000;

fn backend<E: std::error::Error>(err: E) -> StorageError {
    StorageError::Backend(DisplayErrorContext(err).to_string())
}

/// Object storage in a single S3 bucket.
#[derive(Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from the default credential chain, optionally pinning
    /// the region.
    pub async fn from_env(bucket: impl Into<String>, region: Option<String>) -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&config);
        if let Some(region) = region {
            builder = builder.region(Region::new(region));
        }
        Self::new(S3Client::from_conf(builder.build()), bucket)
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
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
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .set_cache_control(cache_control.map(str::to_string))
            .send()
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::NotFound(key.to_string())
                } else {
                    backend(e)
                }
            })?;
        let data = output.body.collect().await.map_err(backend)?;
        Ok(data.into_bytes().to_vec())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(backend)?;

            keys.extend(page.contents().iter().filter_map(|o| o.key().map(str::to_string)));

            match page.next_continuation_token() {
                Some(token) if page.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }
        Ok(keys)
    }

    async fn delete_objects(&self, keys: &[String]) -> Result<DeleteReport, StorageError> {
        let mut report = DeleteReport::default();
        for chunk in keys.chunks(DELETE_BATCH) {
            let objects = chunk
                .iter()
                .map(|k| ObjectIdentifier::builder().key(k).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| StorageError::InvalidRequest(e.to_string()))?;
            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|e| StorageError::InvalidRequest(e.to_string()))?;

            let output = self
                .client
                .delete_objects()
                .bucket(&self.bucket)
                .delete(delete)
                .send()
                .await
                .map_err(backend)?;

            let failed: Vec<(String, String)> = output
                .errors()
                .iter()
                .map(|e| {
                    (
                        e.key().unwrap_or_default().to_string(),
                        e.message().unwrap_or("unknown error").to_string(),
                    )
                })
                .collect();
            report.deleted.extend(
                chunk
                    .iter()
                    .filter(|k| !failed.iter().any(|(f, _)| f == *k))
                    .cloned(),
            );
            report.failed.extend(failed);
        }
        Ok(report)
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::InvalidRequest(e.to_string()))?;
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(backend)?;
        Ok(request.uri().to_string())
    }
}
