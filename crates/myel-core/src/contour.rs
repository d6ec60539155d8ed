//! Contour extraction: trace region borders from the binary mask and
//! keep the ones worth offering for selection.
//!
//! This module defines the [`ContourTracer`] trait for pluggable tracing
//! algorithms and the [`ContourTracerKind`] enum for selecting one at
//! runtime, followed by the vertex-count and area filter that turns raw
//! traces into the available selection pool.

use image::GrayImage;

use crate::geometry::{Contour, MIN_CONTOUR_POINTS};
use crate::types::Point;

/// Selects which contour tracing algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContourTracerKind {
    /// Suzuki-Abe border following via `imageproc::contours::find_contours`,
    /// with straight runs collapsed to their endpoints.
    ///
    /// Both outer borders and hole borders are returned, flattened into
    /// a single list in discovery order.
    #[default]
    BorderFollowing,
}

/// Trait for contour tracing strategies.
///
/// Input: a binary mask (non-zero pixels = foreground).
/// Output: every region border, one closed contour per border.
pub trait ContourTracer {
    /// Trace contours in the given binary mask.
    fn trace(&self, mask: &GrayImage) -> Vec<Contour>;
}

impl ContourTracer for ContourTracerKind {
    fn trace(&self, mask: &GrayImage) -> Vec<Contour> {
        match *self {
            Self::BorderFollowing => trace_border_following(mask),
        }
    }
}

fn trace_border_following(mask: &GrayImage) -> Vec<Contour> {
    let contours: Vec<imageproc::contours::Contour<i32>> =
        imageproc::contours::find_contours(mask);

    contours
        .into_iter()
        .map(|c| {
            let points: Vec<Point> = c.points.into_iter().map(|p| Point::new(p.x, p.y)).collect();
            Contour::new(compress_runs(&points))
        })
        .collect()
}

/// Drop vertices that continue a straight run in the same direction.
///
/// Border following emits every boundary pixel; only the points where
/// the chain turns are kept. The contour is treated as closed, so the
/// first vertex is dropped too when it sits in the middle of a run.
#[must_use]
pub fn compress_runs(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let step = |a: Point, b: Point| ((b.x - a.x).signum(), (b.y - a.y).signum());
    let kept: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect();
    if kept.is_empty() {
        points.to_vec()
    } else {
        kept
    }
}

/// Keep contours with enough vertices whose area lies in
/// `[min_size, max_size]` (both ends inclusive).
#[must_use]
pub fn filter_contours(contours: Vec<Contour>, min_size: f64, max_size: f64) -> Vec<Contour> {
    contours
        .into_iter()
        .filter(|c| {
            c.len() >= MIN_CONTOUR_POINTS && (min_size..=max_size).contains(&c.area())
        })
        .collect()
}

/// Trace `mask` and filter the result into the selection pool.
#[must_use = "returns the available contours"]
pub fn extract(
    tracer: &impl ContourTracer,
    mask: &GrayImage,
    min_size: f64,
    max_size: f64,
) -> Vec<Contour> {
    let traced = tracer.trace(mask);
    let total = traced.len();
    let kept = filter_contours(traced, min_size, max_size);
    log::debug!(
        "traced {total} contours, {} within [{min_size}, {max_size}]",
        kept.len()
    );
    kept
}
