//! Overlay compositing with tiny-skia.
//!
//! A frame is built in two layers. The overlay starts as a copy of the
//! base image and receives contour outlines and fills; it is then
//! blended over the base at the configured opacity. Counter dots and
//! strokes are painted opaque on top of the blend.

use image::RgbaImage;
use tiny_skia::{
    FillRule, IntSize, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform,
};

use crate::annotation::{Annotations, Category, StrokeColor};
use crate::geometry::Contour;
use crate::pairing::Pairing;
use crate::tools::{Highlight, HighlightKind, Preview};
use crate::types::{CoreError, DisplayOptions, MYELINATED_GROUP, Point, UNMYELINATED_GROUP};

/// Opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Color {
    /// Build a colour from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn paint(self) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(self.r, self.g, self.b, 255);
        paint.anti_alias = true;
        paint
    }
}

pub mod palette {
    //! Fixed overlay colours.
    use super::Color;

    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const RED_HIGHLIGHT: Color = Color::rgb(255, 135, 135);
    pub const GREEN_HIGHLIGHT: Color = Color::rgb(175, 255, 138);
    pub const CYAN_HIGHLIGHT: Color = Color::rgb(132, 245, 241);
    pub const ORANGE_HIGHLIGHT: Color = Color::rgb(255, 153, 0);
    pub const PURPLE: Color = Color::rgb(232, 20, 255);
    pub const LIME: Color = Color::rgb(150, 247, 5);
    pub const PINK: Color = Color::rgb(255, 20, 228);
}

/// Radius of a counter dot.
pub const COUNTER_RADIUS: f32 = 3.0;

/// Width of the black ring around counter dots and of the eraser ring.
pub const RING_WIDTH: f32 = 2.0;

/// Dot colour for a counter group.
#[must_use]
pub fn group_color(group: &str) -> Color {
    match group {
        UNMYELINATED_GROUP => palette::PURPLE,
        MYELINATED_GROUP => palette::LIME,
        _ => palette::PINK,
    }
}

/// Stroke colour as painted on screen.
#[must_use]
pub const fn stroke_color(color: StrokeColor) -> Color {
    match color {
        StrokeColor::Cut => palette::WHITE,
        StrokeColor::Draw => palette::BLACK,
    }
}

const fn highlight_color(kind: HighlightKind) -> Color {
    match kind {
        HighlightKind::Committed => palette::RED_HIGHLIGHT,
        HighlightKind::Available => palette::GREEN_HIGHLIGHT,
    }
}

#[allow(clippy::cast_precision_loss)]
fn polyline_path(points: &[Point], closed: bool) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    if rest.is_empty() {
        // Zero-length segment so round caps still paint a dot.
        pb.line_to(first.x as f32, first.y as f32);
    }
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    if closed {
        pb.close();
    }
    pb.finish()
}

#[allow(clippy::cast_precision_loss)]
fn circle_path(center: Point, radius: f32) -> Option<Path> {
    PathBuilder::from_circle(center.x as f32, center.y as f32, radius)
}

fn stroke_style(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

/// An RGBA raster being painted on.
///
/// Every pixel is kept opaque, so the premultiplied pixmap data is the
/// plain RGBA data.
pub struct Canvas {
    pixmap: Pixmap,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

impl Canvas {
    /// Start from a copy of `image`. Alpha is forced opaque.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Render`] if the image has no pixels.
    pub fn from_rgba(image: &RgbaImage) -> Result<Self, CoreError> {
        let (width, height) = image.dimensions();
        let mut data = image.as_raw().clone();
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        IntSize::from_wh(width, height)
            .and_then(|size| Pixmap::from_vec(data, size))
            .map(|pixmap| Self { pixmap })
            .ok_or(CoreError::Render { width, height })
    }

    /// Fill the interior of `contour`.
    pub fn fill_contour(&mut self, contour: &Contour, color: Color) {
        if let Some(path) = polyline_path(contour.points(), true) {
            self.pixmap.fill_path(
                &path,
                &color.paint(),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// Stroke the closed outline of `contour`.
    #[allow(clippy::cast_precision_loss)]
    pub fn outline_contour(&mut self, contour: &Contour, color: Color, width: u32) {
        if let Some(path) = polyline_path(contour.points(), true) {
            self.stroke(&path, color, width.max(1) as f32);
        }
    }

    /// Stroke an open polyline.
    #[allow(clippy::cast_precision_loss)]
    pub fn polyline(&mut self, points: &[Point], color: Color, width: u32) {
        if let Some(path) = polyline_path(points, false) {
            self.stroke(&path, color, width.max(1) as f32);
        }
    }

    /// Filled disc.
    pub fn dot(&mut self, center: Point, radius: f32, color: Color) {
        if let Some(path) = circle_path(center, radius) {
            self.pixmap.fill_path(
                &path,
                &color.paint(),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// Circle outline.
    pub fn ring(&mut self, center: Point, radius: f32, color: Color, width: f32) {
        if let Some(path) = circle_path(center, radius) {
            self.stroke(&path, color, width);
        }
    }

    /// A counter marker: group-coloured dot with a black rim.
    pub fn counter(&mut self, at: Point, group: &str) {
        self.dot(at, COUNTER_RADIUS, group_color(group));
        self.ring(at, COUNTER_RADIUS, palette::BLACK, RING_WIDTH);
    }

    fn stroke(&mut self, path: &Path, color: Color, width: f32) {
        self.pixmap.stroke_path(
            path,
            &color.paint(),
            &stroke_style(width),
            Transform::identity(),
            None,
        );
    }

    /// Finish painting.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Render`] if the pixel buffer does not match
    /// the canvas size.
    pub fn into_rgba(self) -> Result<RgbaImage, CoreError> {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        RgbaImage::from_raw(width, height, self.pixmap.take())
            .ok_or(CoreError::Render { width, height })
    }
}

/// Per-pixel `alpha * overlay + (1 - alpha) * base`.
///
/// Both images must share dimensions; the result is opaque.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops
)]
pub fn blend(overlay: &RgbaImage, base: &RgbaImage, alpha: f64) -> RgbaImage {
    let alpha = alpha.clamp(0.0, 1.0);
    let mut out = base.clone();
    for (o, px) in overlay.pixels().zip(out.pixels_mut()) {
        for c in 0..3 {
            let v = f64::from(o.0[c]).mul_add(alpha, f64::from(px.0[c]) * (1.0 - alpha));
            px.0[c] = v.round().clamp(0.0, 255.0) as u8;
        }
        px.0[3] = 255;
    }
    out
}

/// Everything one full frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    /// Working image, or the binarized image when the threshold view is on.
    pub base: &'a RgbaImage,
    /// Current selection pool.
    pub available: &'a [Contour],
    /// Committed state.
    pub annotations: &'a Annotations,
    /// Pairing of the committed fiber contours.
    pub pairing: &'a Pairing,
    /// Hover highlights.
    pub highlights: &'a [Highlight],
    /// Layer toggles.
    pub display: DisplayOptions,
    /// Overlay opacity.
    pub alpha: f64,
    /// Outline width.
    pub outline_thickness: u32,
    /// Skip outlines, fills and highlights while a trace is drawn.
    pub hide_decorations: bool,
}

/// Composite a full frame.
///
/// # Errors
///
/// Returns [`CoreError::Render`] if a canvas cannot be allocated.
pub fn render_scene(scene: &Scene<'_>) -> Result<RgbaImage, CoreError> {
    let display = scene.display;
    let mut overlay = Canvas::from_rgba(scene.base)?;

    if display.outlines && !scene.hide_decorations {
        for c in scene.available {
            overlay.outline_contour(c, palette::YELLOW, scene.outline_thickness);
        }
        for (_, c) in scene.annotations.contours.iter() {
            overlay.outline_contour(c, palette::BLACK, scene.outline_thickness);
        }
    }

    if display.highlights && !scene.hide_decorations {
        for triple in &scene.pairing.triples {
            for c in triple.members() {
                overlay.fill_contour(c, palette::CYAN_HIGHLIGHT);
            }
        }
        for (_, c) in scene.pairing.orphans.iter() {
            overlay.fill_contour(c, palette::ORANGE_HIGHLIGHT);
        }
        for c in scene.annotations.contours.get(Category::Misc) {
            overlay.fill_contour(c, palette::CYAN_HIGHLIGHT);
        }
        for h in scene.highlights {
            overlay.fill_contour(&h.contour, highlight_color(h.kind));
        }
    }

    let blended = blend(&overlay.into_rgba()?, scene.base, scene.alpha);
    if !(display.counters || display.lines) {
        return Ok(blended);
    }

    let mut top = Canvas::from_rgba(&blended)?;
    if display.counters {
        for counter in &scene.annotations.counters {
            top.counter(counter.position, &counter.group);
        }
    }
    if display.lines {
        for stroke in &scene.annotations.strokes {
            top.polyline(
                &stroke.path.points(),
                stroke_color(stroke.color),
                stroke.thickness,
            );
        }
    }
    top.into_rgba()
}

/// Draw a gesture preview onto a copy of a cached frame.
///
/// `show_lines` gates the straight-segment preview, as strokes
/// themselves are gated by the lines layer.
///
/// # Errors
///
/// Returns [`CoreError::Render`] if a canvas cannot be allocated.
#[allow(clippy::cast_precision_loss)]
pub fn draw_preview(
    frame: &RgbaImage,
    preview: &Preview,
    show_lines: bool,
) -> Result<RgbaImage, CoreError> {
    if *preview == Preview::None {
        return Ok(frame.clone());
    }
    let mut canvas = Canvas::from_rgba(frame)?;
    match preview {
        Preview::None => {}
        Preview::Segment {
            from,
            to,
            thickness,
        } => {
            if show_lines {
                canvas.polyline(&[*from, *to], palette::GREEN, *thickness);
            }
        }
        Preview::Path { points, .. } => canvas.polyline(points, palette::GREEN, 1),
        Preview::Dot { at, group } => canvas.counter(*at, group),
        Preview::Ring { center, radius } => {
            canvas.ring(*center, *radius as f32, palette::BLACK, RING_WIDTH);
        }
    }
    canvas.into_rgba()
}
