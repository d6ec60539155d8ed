//! Two-stage binarization.
//!
//! Intensities are first truncated at the threshold, then split at
//! `floor(threshold * 15 / 16)`: a pixel is foreground (255) when its
//! truncated value is strictly greater than the split point. The
//! truncation step keeps the result stable for pixels hovering right at
//! the threshold.

use image::GrayImage;
use imageproc::contrast::{ThresholdType, threshold};

/// Split point used by the second stage.
#[must_use]
pub const fn split_point(threshold: u8) -> u8 {
    // 15 * 255 / 16 fits in a u16 and the quotient fits back in a u8.
    #[allow(clippy::cast_possible_truncation)]
    let split = (threshold as u16 * 15 / 16) as u8;
    split
}

/// Binarize `image` at `level`.
#[must_use = "returns the binary mask"]
pub fn binarize(image: &GrayImage, level: u8) -> GrayImage {
    let truncated = threshold(image, level, ThresholdType::Truncate);
    threshold(&truncated, split_point(level), ThresholdType::Binary)
}
