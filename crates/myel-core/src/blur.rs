//! Edge-preserving bilateral smoothing.
//!
//! Flat regions are smoothed while the sharp boundary between bright
//! axoplasm and dark myelin survives, which keeps traced contours tight
//! against the sheath.

use image::GrayImage;
use imageproc::filter::bilateral::{GaussianEuclideanColorDistance, bilateral_filter};

/// Intensity sigma used for every smoothing strength.
pub const SIGMA_COLOR: f32 = 75.0;

/// Spatial sigma used for every smoothing strength.
pub const SIGMA_SPACE: f32 = 75.0;

/// Window radius for a given smoothing strength.
///
/// The window diameter is `1 + strength`, so strength 9 uses a radius
/// of 5 pixels. Saturates at the largest radius the filter accepts.
#[must_use]
pub fn window_radius(strength: u32) -> u8 {
    u8::try_from(strength.saturating_add(1) / 2).unwrap_or(u8::MAX)
}

/// Apply the bilateral filter at the given smoothing strength.
///
/// A strength of zero returns the image unchanged.
#[must_use = "returns the smoothed image"]
pub fn bilateral(image: &GrayImage, strength: u32) -> GrayImage {
    if strength == 0 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    bilateral_filter(
        image,
        window_radius(strength),
        SIGMA_SPACE,
        GaussianEuclideanColorDistance::new(SIGMA_COLOR),
    )
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;

    #[test]
    fn zero_strength_is_identity() {
        let img = GrayImage::from_fn(8, 8, |x, y| Luma([((x * 31 + y * 7) % 256) as u8]));
        assert_eq!(bilateral(&img, 0), img);
    }

    #[test]
    fn uniform_image_stays_flat() {
        let img = GrayImage::from_pixel(12, 9, Luma([90]));
        assert!(bilateral(&img, 9).pixels().all(|p| p.0[0].abs_diff(90) <= 1));
    }

    #[test]
    fn output_dimensions_match_input() {
        let img = GrayImage::from_pixel(13, 7, Luma([10]));
        assert_eq!(bilateral(&img, 4).dimensions(), (13, 7));
    }

    #[test]
    fn strong_edge_survives() {
        // Left half black, right half white.
        let img = GrayImage::from_fn(20, 10, |x, _| Luma([if x < 10 { 0 } else { 255 }]));
        let out = bilateral(&img, 9);
        assert!(out.get_pixel(2, 5).0[0] < 60);
        assert!(out.get_pixel(17, 5).0[0] > 195);
    }

    #[test]
    fn isolated_speck_is_softened() {
        let mut img = GrayImage::from_pixel(11, 11, Luma([100]));
        img.put_pixel(5, 5, Luma([140]));
        let out = bilateral(&img, 4);
        assert!(out.get_pixel(5, 5).0[0] < 140);
    }

    #[test]
    fn window_radius_matches_diameter() {
        assert_eq!(window_radius(9), 5);
        assert_eq!(window_radius(1), 1);
        assert_eq!(window_radius(2), 1);
        assert_eq!(window_radius(u32::MAX), u8::MAX);
    }
}
