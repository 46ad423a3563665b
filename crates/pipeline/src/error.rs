use bartender_cloud::StorageError;

/// Error type for image processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The object key is not a raw drink upload.
    #[error("Not a drink image upload: {0}")]
    InvalidKey(String),

    /// The source is smaller than the minimum accepted size.
    #[error("Image too small: {width}x{height}, minimum is {min}x{min}")]
    TooSmall { width: u32, height: u32, min: u32 },

    #[error("Image decode failed: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Image encode failed: {0}")]
    Encode(#[source] image::ImageError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The blocking resize task panicked or was cancelled.
    #[error("Resize task failed: {0}")]
    Task(String),
}

impl PipelineError {
    /// Whether running the same job again could succeed. Bad keys and
    /// unusable images fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Storage(_) | PipelineError::Task(_))
    }
}
