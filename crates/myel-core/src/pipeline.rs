//! Staged segmentation: grayscale in, selection pool out.
//!
//! [`Pipeline`] lets the caller drive the preprocessing one step at a
//! time and inspect every intermediate:
//!
//! ```rust
//! # use myel_core::pipeline::{Pipeline, SegmentParams};
//! # use myel_core::ContourTracerKind;
//! # use myel_core::types::GrayImage;
//! let gray = GrayImage::new(32, 32);
//! let segmentation = Pipeline::new(gray, SegmentParams::default())
//!     .smooth()
//!     .binarize()
//!     .burn(&[])
//!     .extract(&ContourTracerKind::default())
//!     .into_result();
//! assert!(segmentation.available.is_empty());
//! ```
//!
//! Each stage method consumes `self` and returns the next stage,
//! carrying the intermediates the renderer needs (the pre-stroke binary
//! image backs the threshold overlay). Every stage is a pure function of
//! its inputs; the editor decides when to rerun it.

use image::GrayImage;

use crate::annotation::Stroke;
use crate::contour::ContourTracer;
use crate::geometry::Contour;
use crate::types::EditorConfig;

/// The subset of [`EditorConfig`] that affects segmentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentParams {
    /// Binarization threshold.
    pub threshold: u8,
    /// Smoothing strength (0 disables it).
    pub blur: u32,
    /// Minimum contour area, inclusive.
    pub min_size: f64,
    /// Maximum contour area, inclusive.
    pub max_size: f64,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for SegmentParams {
    fn from(config: &EditorConfig) -> Self {
        Self {
            threshold: config.threshold,
            blur: config.blur,
            min_size: config.min_size,
            max_size: config.max_size,
        }
    }
}

/// Everything one segmentation pass produces.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Binarized image before strokes were burned in.
    pub binary: GrayImage,
    /// Binary mask with strokes burned in; this is what was traced.
    pub mask: GrayImage,
    /// Contours that passed the vertex and area filter.
    pub available: Vec<Contour>,
}

/// Run the whole pass in one call.
#[must_use = "returns the segmentation"]
pub fn segment(
    gray: GrayImage,
    params: SegmentParams,
    strokes: &[Stroke],
    tracer: &impl ContourTracer,
) -> Segmentation {
    Pipeline::new(gray, params)
        .smooth()
        .binarize()
        .burn(strokes)
        .extract(tracer)
        .into_result()
}

/// Entry point for the staged pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Start a pass over a grayscale working image.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(gray: GrayImage, params: SegmentParams) -> Pending {
        Pending { params, gray }
    }
}

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Grayscale input, untouched.
#[must_use = "pipeline stages are consumed by advancing; call .smooth() to continue"]
pub struct Pending {
    params: SegmentParams,
    gray: GrayImage,
}

impl Pending {
    /// The grayscale input.
    #[must_use]
    pub const fn gray(&self) -> &GrayImage {
        &self.gray
    }

    /// Apply bilateral smoothing and advance to [`Smoothed`].
    pub fn smooth(self) -> Smoothed {
        let smoothed = crate::blur::bilateral(&self.gray, self.params.blur);
        Smoothed {
            params: self.params,
            smoothed,
        }
    }
}

// ───────────────────────── Stage 1: Smoothed ─────────────────────────

/// Smoothed grayscale.
#[must_use = "pipeline stages are consumed by advancing; call .binarize() to continue"]
pub struct Smoothed {
    params: SegmentParams,
    smoothed: GrayImage,
}

impl Smoothed {
    /// The smoothed image.
    #[must_use]
    pub const fn smoothed(&self) -> &GrayImage {
        &self.smoothed
    }

    /// Binarize and advance to [`Binarized`].
    pub fn binarize(self) -> Binarized {
        let binary = crate::threshold::binarize(&self.smoothed, self.params.threshold);
        Binarized {
            params: self.params,
            binary,
        }
    }
}

// ───────────────────────── Stage 2: Binarized ────────────────────────

/// Binary image before any strokes.
#[must_use = "pipeline stages are consumed by advancing; call .burn() to continue"]
pub struct Binarized {
    params: SegmentParams,
    binary: GrayImage,
}

impl Binarized {
    /// The binary image.
    #[must_use]
    pub const fn binary(&self) -> &GrayImage {
        &self.binary
    }

    /// Burn `strokes` into a copy of the binary image and advance to
    /// [`Burned`].
    pub fn burn(self, strokes: &[Stroke]) -> Burned {
        let mut mask = self.binary.clone();
        crate::mask::burn_strokes(&mut mask, strokes);
        Burned {
            params: self.params,
            binary: self.binary,
            mask,
        }
    }
}

// ───────────────────────── Stage 3: Burned ───────────────────────────

/// Binary mask with strokes applied.
#[must_use = "pipeline stages are consumed by advancing; call .extract() to continue"]
pub struct Burned {
    params: SegmentParams,
    binary: GrayImage,
    mask: GrayImage,
}

impl Burned {
    /// The mask that will be traced.
    #[must_use]
    pub const fn mask(&self) -> &GrayImage {
        &self.mask
    }

    /// Trace and filter contours, advancing to [`Extracted`].
    pub fn extract(self, tracer: &impl ContourTracer) -> Extracted {
        let available = crate::contour::extract(
            tracer,
            &self.mask,
            self.params.min_size,
            self.params.max_size,
        );
        Extracted {
            binary: self.binary,
            mask: self.mask,
            available,
        }
    }
}

// ───────────────────────── Stage 4: Extracted ────────────────────────

/// Final stage: the selection pool is ready.
#[must_use = "call .into_result() to take the segmentation"]
pub struct Extracted {
    binary: GrayImage,
    mask: GrayImage,
    available: Vec<Contour>,
}

impl Extracted {
    /// Contours available for selection.
    #[must_use]
    pub fn available(&self) -> &[Contour] {
        &self.available
    }

    /// Take every intermediate.
    #[must_use]
    pub fn into_result(self) -> Segmentation {
        Segmentation {
            binary: self.binary,
            mask: self.mask,
            available: self.available,
        }
    }
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;
    use crate::annotation::{StrokeColor, StrokePath};
    use crate::contour::ContourTracerKind;
    use crate::types::Point;

    /// Two bright disks on a dark background.
    #[allow(clippy::cast_possible_wrap)]
    fn two_cells() -> GrayImage {
        GrayImage::from_fn(120, 60, |x, y| {
            let (x, y) = (x as i32, y as i32);
            let a = (x - 30).pow(2) + (y - 30).pow(2) <= 20 * 20;
            let b = (x - 90).pow(2) + (y - 30).pow(2) <= 20 * 20;
            Luma([if a || b { 220 } else { 30 }])
        })
    }

    fn params() -> SegmentParams {
        SegmentParams {
            threshold: 122,
            blur: 0,
            min_size: 100.0,
            max_size: 5000.0,
        }
    }

    #[test]
    fn stages_expose_intermediates() {
        let gray = two_cells();
        let pending = Pipeline::new(gray.clone(), params());
        assert_eq!(pending.gray(), &gray);
        let smoothed = pending.smooth();
        assert_eq!(smoothed.smoothed(), &gray);
        let binarized = smoothed.binarize();
        assert_eq!(binarized.binary().get_pixel(30, 30).0[0], 255);
        assert_eq!(binarized.binary().get_pixel(60, 5).0[0], 0);
    }

    #[test]
    fn two_cells_give_two_contours() {
        let seg = segment(two_cells(), params(), &[], &ContourTracerKind::default());
        assert_eq!(seg.available.len(), 2);
        assert_eq!(seg.binary, seg.mask);
    }

    #[test]
    fn draw_stroke_splits_a_cell() {
        let draw = Stroke {
            thickness: 3,
            color: StrokeColor::Draw,
            path: StrokePath::Straight(Point::new(30, 0), Point::new(30, 59)),
        };
        let seg = segment(two_cells(), params(), &[draw], &ContourTracerKind::default());
        assert_eq!(seg.available.len(), 3);
        assert_ne!(seg.binary, seg.mask);
    }

    #[test]
    fn cut_stroke_bridges_cells() {
        let cut = Stroke {
            thickness: 5,
            color: StrokeColor::Cut,
            path: StrokePath::Straight(Point::new(45, 30), Point::new(75, 30)),
        };
        let seg = segment(two_cells(), params(), &[cut], &ContourTracerKind::default());
        assert_eq!(seg.available.len(), 1);
    }

    #[test]
    fn area_window_filters_everything_out() {
        let p = SegmentParams {
            min_size: 10_000.0,
            max_size: 50_000.0,
            ..params()
        };
        let seg = segment(two_cells(), p, &[], &ContourTracerKind::default());
        assert!(seg.available.is_empty());
    }

    #[test]
    fn smoothing_keeps_cells() {
        let p = SegmentParams {
            blur: 9,
            ..params()
        };
        let seg = segment(two_cells(), p, &[], &ContourTracerKind::default());
        assert_eq!(seg.available.len(), 2);
    }
}
