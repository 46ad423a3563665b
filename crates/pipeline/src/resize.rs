//! Pure image transforms.

use std::io::Cursor;

use bartender_core::images::ImageSize;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::error::PipelineError;

/// Decode raw bytes in any supported format.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    image::load_from_memory(bytes).map_err(PipelineError::Decode)
}

/// Composite any transparency onto a white background.
pub fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Shrink `image` so its longer edge fits `size`, keeping the aspect ratio.
/// Images already within bounds are returned unchanged.
pub fn fit_within(image: &DynamicImage, size: ImageSize) -> DynamicImage {
    let max = size.max_dimension();
    if image.width() <= max && image.height() <= max {
        return image.clone();
    }
    image.resize(max, max, FilterType::Lanczos3)
}

/// Encode as WebP.
pub fn encode_webp(image: &DynamicImage) -> Result<Vec<u8>, PipelineError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::WebP)
        .map_err(PipelineError::Encode)?;
    Ok(buf)
}

/// Decode, flatten, fit, and encode one variant.
pub fn resize_to_webp(bytes: &[u8], size: ImageSize) -> Result<Vec<u8>, PipelineError> {
    let source = DynamicImage::ImageRgb8(flatten_on_white(&decode(bytes)?));
    encode_webp(&fit_within(&source, size))
}
