//! End-to-end processing of one uploaded drink image.

use std::collections::BTreeMap;
use std::sync::Arc;

use bartender_cloud::ObjectStorage;
use bartender_core::images::{
    optimized_key, parse_original_key, ImageSize, MIN_SOURCE_DIMENSION,
    OPTIMIZED_CACHE_CONTROL, OPTIMIZED_CONTENT_TYPE,
};
use bartender_core::types::DbId;
use image::GenericImageView;
use serde::Serialize;

use crate::error::PipelineError;
use crate::resize::{decode, encode_webp, fit_within, flatten_on_white};

/// Public URLs of the variants produced for one drink.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedImages {
    pub drink_id: DbId,
    /// Size name (`thumbnail`, `small`, `medium`, `large`) to public URL.
    pub urls: BTreeMap<String, String>,
}

impl ProcessedImages {
    /// URL stored on the drink row.
    pub fn primary_url(&self) -> Option<&str> {
        self.urls.get(ImageSize::Medium.name()).map(String::as_str)
    }
}

/// Downloads an upload, renders every [`ImageSize`], and uploads the results.
#[derive(Clone)]
pub struct ImageProcessor {
    storage: Arc<dyn ObjectStorage>,
    cdn_domain: Option<String>,
}

impl ImageProcessor {
    pub fn new(storage: Arc<dyn ObjectStorage>, cdn_domain: Option<String>) -> Self {
        Self {
            storage,
            cdn_domain,
        }
    }

    /// Process the raw upload stored under `key`.
    pub async fn process(&self, key: &str) -> Result<ProcessedImages, PipelineError> {
        let drink_id =
            parse_original_key(key).ok_or_else(|| PipelineError::InvalidKey(key.to_string()))?;

        let source = self.storage.get_object(key).await?;
        tracing::info!(%drink_id, key, bytes = source.len(), "Processing drink image");

        let variants = tokio::task::spawn_blocking(move || render_variants(&source))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))??;

        let mut urls = BTreeMap::new();
        for (size, body) in variants {
            let target = optimized_key(size, drink_id);
            self.storage
                .put_object(
                    &target,
                    body,
                    OPTIMIZED_CONTENT_TYPE,
                    Some(OPTIMIZED_CACHE_CONTROL),
                )
                .await?;
            let url = self.storage.public_url(&target, self.cdn_domain.as_deref());
            tracing::debug!(%drink_id, size = %size, url = %url, "Uploaded image variant");
            urls.insert(size.name().to_string(), url);
        }

        Ok(ProcessedImages { drink_id, urls })
    }
}

/// Decode once and encode every size. Runs on a blocking thread.
fn render_variants(source: &[u8]) -> Result<Vec<(ImageSize, Vec<u8>)>, PipelineError> {
    let decoded = decode(source)?;
    let (width, height) = decoded.dimensions();
    if width < MIN_SOURCE_DIMENSION || height < MIN_SOURCE_DIMENSION {
        return Err(PipelineError::TooSmall {
            width,
            height,
            min: MIN_SOURCE_DIMENSION,
        });
    }

    let flat = image::DynamicImage::ImageRgb8(flatten_on_white(&decoded));
    ImageSize::ALL
        .iter()
        .map(|size| Ok((*size, encode_webp(&fit_within(&flat, *size))?)))
        .collect()
}
