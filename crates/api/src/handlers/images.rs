//! Handlers for drink image uploads and storage notifications.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use bartender_core::error::CoreError;
use bartender_core::images::{extension_for, original_key, ORIGINAL_PREFIX, UPLOAD_URL_EXPIRY_SECS};
use bartender_core::types::DbId;
use bartender_db::repositories::DrinkRepo;
use serde::{Deserialize, Serialize};

use crate::auth::signature::{verify, SIGNATURE_HEADER};
use crate::background::image_processing;
use crate::error::{AppError, AppResult};
use crate::extract::{parse_lenient, LenientJson};
use crate::middleware::admin::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /admin/images/upload-url`.
#[derive(Debug, Default, Deserialize)]
pub struct UploadUrlRequest {
    pub drink_id: Option<DbId>,
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub image_key: String,
    pub bucket: String,
    pub expires_in: u64,
}

/// Object-created notification in the S3 event shape. Unknown fields are
/// ignored.
#[derive(Debug, Default, Deserialize)]
pub struct StorageNotification {
    #[serde(rename = "Records", default)]
    pub records: Vec<StorageRecord>,
}

#[derive(Debug, Deserialize)]
pub struct StorageRecord {
    #[serde(rename = "eventName", default)]
    pub event_name: String,
    pub s3: StorageEntity,
}

#[derive(Debug, Deserialize)]
pub struct StorageEntity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Deserialize)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ObjectRef {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct StorageEventsResponse {
    pub accepted: usize,
    pub ignored: usize,
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/images/upload-url
///
/// Presigned `PUT` URL for a drink's raw image. Valid for five minutes.
pub async fn create_upload_url(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    LenientJson(input): LenientJson<UploadUrlRequest>,
) -> AppResult<impl IntoResponse> {
    let storage = state
        .storage
        .as_ref()
        .ok_or_else(|| AppError::InternalError("Image storage is not configured".into()))?;

    let drink_id = input
        .drink_id
        .ok_or_else(|| CoreError::Validation("drink_id is required".into()))?;
    let content_type = input
        .content_type
        .as_deref()
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .ok_or_else(|| CoreError::Validation("content_type is required".into()))?;
    let ext = extension_for(content_type)?;

    DrinkRepo::find_by_id(&state.pool, drink_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Drink",
            id: drink_id,
        })?;

    let image_key = original_key(drink_id, ext);
    let upload_url = storage
        .presign_put(
            &image_key,
            content_type,
            Duration::from_secs(UPLOAD_URL_EXPIRY_SECS),
        )
        .await?;

    tracing::info!(%drink_id, key = %image_key, admin = %admin.display_name, "Upload URL issued");

    Ok(Json(DataResponse {
        data: UploadUrlResponse {
            upload_url,
            image_key,
            bucket: storage.bucket().to_string(),
            expires_in: UPLOAD_URL_EXPIRY_SECS,
        },
    }))
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

/// POST /api/v1/internal/storage-events
///
/// Object-created notifications from the image bucket, signed with
/// HMAC-SHA256 of the raw body in `X-Storage-Signature`. Each new upload
/// under `original/` is processed in the background.
pub async fn storage_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let secret = state.config.storage_events_secret.as_deref().ok_or_else(|| {
        CoreError::Unauthorized("Storage events are not enabled".into())
    })?;
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::Unauthorized("Missing signature".into()))?;
    if !verify(secret, &body, signature) {
        return Err(CoreError::Unauthorized("Invalid signature".into()).into());
    }

    let notification: StorageNotification = parse_lenient(&body)?;
    let bucket = state.storage.as_ref().map(|s| s.bucket().to_string());

    let mut accepted = 0;
    let mut ignored = 0;
    for record in notification.records {
        let key = record.s3.object.key;
        let wanted = record.event_name.starts_with("ObjectCreated")
            && key.starts_with(ORIGINAL_PREFIX)
            && bucket.as_deref() == Some(record.s3.bucket.name.as_str());

        if wanted && image_processing::spawn(&state, key.clone()) {
            tracing::info!(key = %key, "Image processing scheduled");
            accepted += 1;
        } else {
            tracing::debug!(key = %key, event = %record.event_name, "Storage event ignored");
            ignored += 1;
        }
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: StorageEventsResponse { accepted, ignored },
        }),
    ))
}
