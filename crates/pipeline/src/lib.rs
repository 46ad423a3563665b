//! Drink image pipeline.
//!
//! Turns a raw upload (`original/{drink_id}/…`) into four WebP variants
//! sized for thumbnails, list views, detail views, and full screen, then
//! stores them under `images/optimized/{size}/{drink_id}.webp`.

pub mod error;
pub mod processor;
pub mod resize;

pub use error::PipelineError;
pub use processor::{ImageProcessor, ProcessedImages};
pub use resize::resize_to_webp;
