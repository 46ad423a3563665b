//! Object-key conventions for drink images.
//!
//! Uploads land under `original/{drink_id}/image.{ext}`. The resize pipeline
//! writes one WebP per [`ImageSize`] to
//! `images/optimized/{size}/{drink_id}.webp`.

use std::fmt;

use crate::error::CoreError;
use crate::types::DbId;

/// Prefix for raw uploads.
pub const ORIGINAL_PREFIX: &str = "original/";

/// Lifetime of a presigned upload URL.
pub const UPLOAD_URL_EXPIRY_SECS: u64 = 300;

/// Sources smaller than this on either edge are rejected.
pub const MIN_SOURCE_DIMENSION: u32 = 400;

/// Cache header applied to every optimized variant.
pub const OPTIMIZED_CACHE_CONTROL: &str = "public, max-age=31536000";

/// Content type of optimized variants.
pub const OPTIMIZED_CONTENT_TYPE: &str = "image/webp";

/// Content types accepted for upload, with the file extension used in the key.
pub const ALLOWED_UPLOAD_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];

/// Map an upload content type to its file extension.
pub fn extension_for(content_type: &str) -> Result<&'static str, CoreError> {
    ALLOWED_UPLOAD_TYPES
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            let allowed: Vec<&str> = ALLOWED_UPLOAD_TYPES.iter().map(|(ct, _)| *ct).collect();
            CoreError::Validation(format!(
                "Invalid content_type. Allowed: {}",
                allowed.join(", ")
            ))
        })
}

/// Key for the raw upload of a drink's image.
pub fn original_key(drink_id: DbId, ext: &str) -> String {
    format!("{ORIGINAL_PREFIX}{drink_id}/image.{ext}")
}

/// Prefix under which every raw upload for a drink lives.
pub fn original_prefix(drink_id: DbId) -> String {
    format!("{ORIGINAL_PREFIX}{drink_id}/")
}

/// Target sizes produced by the resize pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSize {
    Thumbnail,
    Small,
    Medium,
    Large,
}

impl ImageSize {
    pub const ALL: [ImageSize; 4] = [
        ImageSize::Thumbnail,
        ImageSize::Small,
        ImageSize::Medium,
        ImageSize::Large,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ImageSize::Thumbnail => "thumbnail",
            ImageSize::Small => "small",
            ImageSize::Medium => "medium",
            ImageSize::Large => "large",
        }
    }

    /// Bounding box edge length in pixels.
    pub fn max_dimension(self) -> u32 {
        match self {
            ImageSize::Thumbnail => 150,
            ImageSize::Small => 400,
            ImageSize::Medium => 800,
            ImageSize::Large => 1200,
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key of one optimized variant.
pub fn optimized_key(size: ImageSize, drink_id: DbId) -> String {
    format!("images/optimized/{}/{drink_id}.webp", size.name())
}

/// Extract the drink id from a raw upload key (`original/{drink_id}/{file}`).
///
/// Returns `None` for keys outside `original/` or with a malformed id.
pub fn parse_original_key(key: &str) -> Option<DbId> {
    let rest = key.strip_prefix(ORIGINAL_PREFIX)?;
    let (id, file) = rest.split_once('/')?;
    if file.is_empty() {
        return None;
    }
    id.parse().ok()
}

/// Public URL of an object, served through the CDN when one is configured.
pub fn public_url(key: &str, bucket: &str, cdn_domain: Option<&str>) -> String {
    match cdn_domain.filter(|d| !d.is_empty()) {
        Some(domain) => format!("https://{domain}/{key}"),
        None => format!("https://{bucket}.s3.amazonaws.com/{key}"),
    }
}
