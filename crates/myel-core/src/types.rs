//! Shared types for the myel segmentation engine.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference the binary
/// mask without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage` so downstream crates can reference working
/// and rendered frames without depending on `image` directly.
pub use image::RgbaImage;

/// A 2D point in working-image pixel coordinates.
///
/// Serialized as a two-element `[x, y]` array, which is the shape used
/// by session files for contour vertices, stroke points and counter
/// positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: i32,
    /// Vertical position (pixels from top edge).
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [i32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Whether `p` lies inside the image rectangle.
    #[must_use]
    pub fn contains(self, p: Point) -> bool {
        p.x >= 0
            && p.y >= 0
            && i64::from(p.x) < i64::from(self.width)
            && i64::from(p.y) < i64::from(self.height)
    }
}

/// Working-resolution factor applied when an image is loaded.
///
/// The working image is the source resized by this factor; measurements
/// divide the calibration by the same factor so physical units stay
/// correct. Any value in `(0, 1]` is accepted; the named presets are the
/// ones offered by the original tool.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Quality(f64);

impl Quality {
    /// Full resolution.
    pub const ORIGINAL: Self = Self(1.0);
    /// 90% of the source dimensions.
    pub const VERY_HIGH: Self = Self(0.9);
    /// 80% of the source dimensions.
    pub const HIGH: Self = Self(0.8);
    /// 70% of the source dimensions.
    pub const MEDIUM: Self = Self(0.7);
    /// 60% of the source dimensions.
    pub const LOW: Self = Self(0.6);
    /// 50% of the source dimensions.
    pub const VERY_LOW: Self = Self(0.5);

    /// Presets, largest first.
    pub const PRESETS: [Self; 6] = [
        Self::ORIGINAL,
        Self::VERY_HIGH,
        Self::HIGH,
        Self::MEDIUM,
        Self::LOW,
        Self::VERY_LOW,
    ];

    /// Create a quality factor.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] unless `factor` is in `(0, 1]`.
    pub fn new(factor: f64) -> Result<Self, CoreError> {
        if factor > 0.0 && factor <= 1.0 {
            Ok(Self(factor))
        } else {
            Err(CoreError::InvalidConfig(format!(
                "quality must be within (0, 1], got {factor}"
            )))
        }
    }

    /// Scale factor relative to the source image.
    #[must_use]
    pub const fn factor(self) -> f64 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::ORIGINAL
    }
}

impl TryFrom<f64> for Quality {
    type Error = CoreError;

    fn try_from(factor: f64) -> Result<Self, Self::Error> {
        Self::new(factor)
    }
}

impl From<Quality> for f64 {
    fn from(q: Quality) -> Self {
        q.0
    }
}

/// Counter group used by the unmyelinated count tool.
pub const UNMYELINATED_GROUP: &str = "Unmyelinated Axons";

/// Counter group used by the myelinated count tool.
pub const MYELINATED_GROUP: &str = "Myelinated Axons";

/// Editor parameters.
///
/// Everything numeric here is persisted in session files. Changing
/// `threshold`, `blur`, `min_size` or `max_size` through the editor
/// invalidates the cached segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Binarization cut point (0-255).
    pub threshold: u8,

    /// Smoothing strength. Zero disables the bilateral filter.
    pub blur: u32,

    /// Minimum accepted contour area (inclusive).
    pub min_size: f64,

    /// Maximum accepted contour area (inclusive).
    pub max_size: f64,

    /// Overlay opacity in `[0, 1]`.
    pub alpha: f64,

    /// Physical length of one source pixel.
    pub calibration: f64,

    /// Working resolution factor the image was loaded at.
    pub quality: Quality,

    /// Outline width used when drawing contours.
    pub outline_thickness: u32,

    /// Label font size. Stored and round-tripped; no text is rendered.
    pub font_size: f64,

    /// Thickness applied to new strokes.
    pub line_thickness: u32,

    /// Remembered thickness for cut strokes.
    pub cut_size: u32,

    /// Remembered thickness for draw strokes.
    pub draw_size: u32,

    /// Eraser radius.
    pub eraser_size: u32,

    /// Last group used by the count tool.
    pub counter_group: String,

    /// Extra multiplier applied to contours at measurement time.
    pub correction_scaling: f64,
}

impl EditorConfig {
    /// Default binarization threshold.
    pub const DEFAULT_THRESHOLD: u8 = 122;
    /// Default bilateral smoothing strength.
    pub const DEFAULT_BLUR: u32 = 9;
    /// Default minimum contour area, in working pixels.
    pub const DEFAULT_MIN_SIZE: f64 = 1000.0;
    /// Default maximum contour area, in working pixels.
    pub const DEFAULT_MAX_SIZE: f64 = 50_000.0;
    /// Default overlay opacity.
    pub const DEFAULT_ALPHA: f64 = 0.4;
    /// Default physical length of one source pixel (µm).
    pub const DEFAULT_CALIBRATION: f64 = 0.003_951;
    /// Default contour outline width.
    pub const DEFAULT_OUTLINE_THICKNESS: u32 = 1;
    /// Default label font size.
    pub const DEFAULT_FONT_SIZE: f64 = 2.0;
    /// Default line thickness.
    pub const DEFAULT_LINE_THICKNESS: u32 = 1;
    /// Default stroke thickness for the cut tool.
    pub const DEFAULT_CUT_SIZE: u32 = 1;
    /// Default stroke thickness for the draw tool.
    pub const DEFAULT_DRAW_SIZE: u32 = 2;
    /// Default eraser radius.
    pub const DEFAULT_ERASER_SIZE: u32 = 20;
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            blur: Self::DEFAULT_BLUR,
            min_size: Self::DEFAULT_MIN_SIZE,
            max_size: Self::DEFAULT_MAX_SIZE,
            alpha: Self::DEFAULT_ALPHA,
            calibration: Self::DEFAULT_CALIBRATION,
            quality: Quality::ORIGINAL,
            outline_thickness: Self::DEFAULT_OUTLINE_THICKNESS,
            font_size: Self::DEFAULT_FONT_SIZE,
            line_thickness: Self::DEFAULT_LINE_THICKNESS,
            cut_size: Self::DEFAULT_CUT_SIZE,
            draw_size: Self::DEFAULT_DRAW_SIZE,
            eraser_size: Self::DEFAULT_ERASER_SIZE,
            counter_group: UNMYELINATED_GROUP.to_owned(),
            correction_scaling: 1.0,
        }
    }
}

impl EditorConfig {
    /// Check the parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] when a value is outside its
    /// accepted range.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(CoreError::InvalidConfig(format!(
                "alpha must be within [0, 1], got {}",
                self.alpha
            )));
        }
        if !(self.calibration.is_finite() && self.calibration > 0.0) {
            return Err(CoreError::InvalidConfig(format!(
                "calibration must be positive, got {}",
                self.calibration
            )));
        }
        if self.min_size.is_nan() || self.max_size.is_nan() {
            return Err(CoreError::InvalidConfig(
                "contour size bounds must be numbers".to_owned(),
            ));
        }
        if !(self.correction_scaling.is_finite() && self.correction_scaling > 0.0) {
            return Err(CoreError::InvalidConfig(format!(
                "correction scaling must be positive, got {}",
                self.correction_scaling
            )));
        }
        Ok(())
    }
}

/// Which overlay layers the rendered frame includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct DisplayOptions {
    /// Contour fills and hover highlights.
    pub highlights: bool,
    /// Binarized image in place of the working image.
    pub threshold: bool,
    /// Cut and draw strokes.
    pub lines: bool,
    /// Count markers.
    pub counters: bool,
    /// Outlines of candidate contours.
    pub outlines: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            highlights: true,
            threshold: false,
            lines: true,
            counters: true,
            outlines: true,
        }
    }
}

/// Errors that can occur in the segmentation engine.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The decoded or resized image has no pixels.
    #[error("image has zero width or height")]
    EmptyImage,

    /// Editor configuration is invalid.
    #[error("invalid editor configuration: {0}")]
    InvalidConfig(String),

    /// The rasteriser could not allocate a canvas for the frame.
    #[error("failed to allocate a {width}x{height} canvas")]
    Render {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}
