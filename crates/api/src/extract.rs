//! Request body extraction tolerant of the shapes admin clients send.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;

/// JSON body extractor that also accepts an empty body (treated as `{}`)
/// and double-encoded JSON (a JSON string whose contents are the object).
///
/// Unlike `axum::Json` it does not require a `Content-Type` header.
#[derive(Debug, Clone)]
pub struct LenientJson<T>(pub T);

impl<S, T> FromRequest<S> for LenientJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read request body: {e}")))?;
        parse_lenient(&bytes).map(LenientJson)
    }
}

/// Decode `bytes` following the [`LenientJson`] rules.
pub fn parse_lenient<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    let invalid_json = || AppError::BadRequest("Invalid JSON body".into());

    let mut value: Value = if bytes.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(bytes).map_err(|_| invalid_json())?
    };

    if let Value::String(inner) = &value {
        value = serde_json::from_str(inner).map_err(|_| invalid_json())?;
    }

    if !value.is_object() {
        return Err(AppError::BadRequest("Invalid request body format".into()));
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
}
