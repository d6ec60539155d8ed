//! Image decoding, working-resolution resize and grayscale conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, TIFF) and produces the
//! opaque RGBA working image the editor annotates, plus the
//! single-channel view the preprocessing pipeline starts from.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, RgbaImage};

use crate::types::{CoreError, Dimensions, Quality};

/// Decode raw image bytes.
///
/// # Errors
///
/// Returns [`CoreError::EmptyInput`] if `bytes` is empty.
/// Returns [`CoreError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
/// Returns [`CoreError::EmptyImage`] if the image has no pixels.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::EmptyInput);
    }
    let img = image::load_from_memory(bytes)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(CoreError::EmptyImage);
    }
    Ok(img)
}

/// Target dimensions for `source` at the given quality.
///
/// Each axis is rounded to the nearest pixel and never drops below one.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scaled_dimensions(source: Dimensions, quality: Quality) -> Dimensions {
    let scale = |v: u32| ((f64::from(v) * quality.factor()).round() as u32).max(1);
    Dimensions {
        width: scale(source.width),
        height: scale(source.height),
    }
}

/// Resize `source` to the working resolution and drop transparency.
///
/// At full quality the image is only converted. Alpha is forced to 255
/// so the working image can be composited as an opaque base layer.
#[must_use = "returns the working image"]
pub fn working_image(source: &DynamicImage, quality: Quality) -> RgbaImage {
    let dims = Dimensions {
        width: source.width(),
        height: source.height(),
    };
    let target = scaled_dimensions(dims, quality);

    let mut rgba = if target == dims {
        source.to_rgba8()
    } else {
        log::debug!(
            "resizing {}x{} -> {}x{} (quality {})",
            dims.width,
            dims.height,
            target.width,
            target.height,
            quality.factor()
        );
        source
            .resize_exact(target.width, target.height, FilterType::Triangle)
            .to_rgba8()
    };

    for pixel in rgba.pixels_mut() {
        pixel.0[3] = 255;
    }
    rgba
}

/// Luminance of the working image.
#[must_use = "returns the grayscale image"]
pub fn to_gray(image: &RgbaImage) -> GrayImage {
    DynamicImage::ImageRgba8(image.clone()).to_luma8()
}
