/// Error type for object-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No object exists under the key.
    #[error("Object not found: {0}")]
    NotFound(String),

    /// A request could not be built (bad key, bad expiry, ...).
    #[error("Invalid storage request: {0}")]
    InvalidRequest(String),

    /// The backend rejected or failed the request.
    #[error("Storage backend error: {0}")]
    Backend(String),
}
