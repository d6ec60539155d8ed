//! Contour geometry and circle tests.
//!
//! [`Contour`] wraps a closed integer polygon and answers the questions
//! the rest of the engine asks of it (area, perimeter, centroid, point
//! classification) through the `geo` crate. The free functions at the
//! bottom are the circle predicates used by the eraser.

use std::ops::Range;

use geo::coordinate_position::CoordPos;
use geo::line_measures::Distance;
use geo::{Area, Centroid, CoordinatePosition, Euclidean, LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::types::Point;

/// Minimum vertex count for a traced contour to enter the selection pool.
pub const MIN_CONTOUR_POINTS: usize = 5;

/// Where a point lies relative to a contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Strictly inside.
    Inside,
    /// On an edge or vertex.
    OnBoundary,
    /// Strictly outside.
    Outside,
}

/// A closed polygon with integer vertices.
///
/// The closing edge from the last vertex back to the first is implicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contour(Vec<Point>);

impl Contour {
    /// Create a contour from its vertices.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Number of vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the contour has no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first vertex, if any.
    #[must_use]
    pub fn first(&self) -> Option<Point> {
        self.0.first().copied()
    }

    /// All vertices.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consume the contour and return its vertices.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    fn polygon(&self) -> Polygon<f64> {
        let ring: LineString<f64> = self
            .0
            .iter()
            .map(|p| (f64::from(p.x), f64::from(p.y)))
            .collect();
        Polygon::new(ring, vec![])
    }

    /// Enclosed area (shoelace), always non-negative.
    #[must_use]
    pub fn area(&self) -> f64 {
        if self.0.len() < 3 {
            return 0.0;
        }
        self.polygon().unsigned_area()
    }

    /// Closed perimeter length.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        self.polygon()
            .exterior()
            .lines()
            .map(|line| Euclidean.distance(line.start_point(), line.end_point()))
            .sum()
    }

    /// Area-weighted centroid, truncated toward zero to pixel coordinates.
    ///
    /// Degenerate polygons fall back to `geo`'s lower-dimensional
    /// centroid; an empty contour has none.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn centroid(&self) -> Option<Point> {
        let c = self.polygon().centroid()?;
        Some(Point::new(c.x() as i32, c.y() as i32))
    }

    /// Classify `p` against this contour.
    #[must_use]
    pub fn position(&self, p: Point) -> Position {
        if self.0.is_empty() {
            return Position::Outside;
        }
        let coord = geo::Coord {
            x: f64::from(p.x),
            y: f64::from(p.y),
        };
        match self.polygon().coordinate_position(&coord) {
            CoordPos::Inside => Position::Inside,
            CoordPos::OnBoundary => Position::OnBoundary,
            CoordPos::Outside => Position::Outside,
        }
    }

    /// Whether `p` lies strictly inside.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.position(p) == Position::Inside
    }

    /// Scale every vertex about the centroid by `factor`.
    ///
    /// Vertices are truncated back to integers after scaling. A factor
    /// of exactly 1.0 returns an identical contour.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn scaled(&self, factor: f64) -> Self {
        if factor == 1.0 {
            return self.clone();
        }
        let Some(c) = self.centroid() else {
            return self.clone();
        };
        let (cx, cy) = (f64::from(c.x), f64::from(c.y));
        Self(
            self.0
                .iter()
                .map(|p| {
                    let x = (f64::from(p.x) - cx).mul_add(factor, cx);
                    let y = (f64::from(p.y) - cy).mul_add(factor, cy);
                    Point::new(x as i32, y as i32)
                })
                .collect(),
        )
    }
}

/// Whether `p` lies within `radius` of `center` (inclusive).
#[must_use]
pub fn point_in_circle(p: Point, center: Point, radius: f64) -> bool {
    p.distance(center) <= radius
}

/// Whether the segment `a`-`b` touches the circle.
///
/// Only the endpoints are tested: a segment that passes through the
/// circle with both endpoints outside is not reported. Strokes erased
/// through this test therefore need an endpoint under the eraser.
#[must_use]
pub fn segment_touches_circle(a: Point, b: Point, center: Point, radius: f64) -> bool {
    point_in_circle(a, center, radius) || point_in_circle(b, center, radius)
}

/// Indices of the polyline vertices inside the circle.
#[must_use]
pub fn indices_in_circle(points: &[Point], center: Point, radius: f64) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| point_in_circle(**p, center, radius))
        .map(|(i, _)| i)
        .collect()
}

/// Contiguous runs of vertex indices that lie outside the circle.
///
/// Each range is half-open and non-empty; ranges are ordered and
/// disjoint.
#[must_use]
pub fn ranges_outside_circle(points: &[Point], center: Point, radius: f64) -> Vec<Range<usize>> {
    let outside: Vec<usize> = (0..points.len())
        .filter(|&i| !point_in_circle(points[i], center, radius))
        .collect();
    contiguous_ranges(&outside)
}

/// Group sorted indices into half-open runs of consecutive values.
///
/// `[1, 2, 3, 5, 8, 9]` becomes `[1..4, 5..6, 8..10]`.
#[must_use]
pub fn contiguous_ranges(sorted: &[usize]) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for &i in sorted {
        match ranges.last_mut() {
            Some(run) if run.end == i => run.end = i + 1,
            _ => ranges.push(i..i + 1),
        }
    }
    ranges
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square(x0: i32, y0: i32, side: i32) -> Contour {
        Contour::new(vec![
            Point::new(x0, y0),
            Point::new(x0 + side, y0),
            Point::new(x0 + side, y0 + side),
            Point::new(x0, y0 + side),
        ])
    }

    #[test]
    fn square_area_and_perimeter() {
        let c = square(0, 0, 10);
        assert!((c.area() - 100.0).abs() < 1e-9);
        assert!((c.perimeter() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn area_ignores_winding() {
        let mut pts = square(0, 0, 10).into_points();
        pts.reverse();
        assert!((Contour::new(pts).area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_contours_have_zero_area() {
        assert!(Contour::new(vec![]).area().abs() < f64::EPSILON);
        let line = Contour::new(vec![Point::new(0, 0), Point::new(5, 5)]);
        assert!(line.area().abs() < f64::EPSILON);
    }

    #[test]
    fn centroid_truncates() {
        let c = square(0, 0, 5);
        assert_eq!(c.centroid(), Some(Point::new(2, 2)));
    }

    #[test]
    fn position_distinguishes_boundary() {
        let c = square(0, 0, 10);
        assert_eq!(c.position(Point::new(5, 5)), Position::Inside);
        assert_eq!(c.position(Point::new(0, 5)), Position::OnBoundary);
        assert_eq!(c.position(Point::new(10, 10)), Position::OnBoundary);
        assert_eq!(c.position(Point::new(11, 5)), Position::Outside);
        assert!(!c.contains(Point::new(0, 0)));
    }

    #[test]
    fn scaled_about_centroid() {
        let c = square(10, 10, 10);
        let s = c.scaled(2.0);
        assert!((s.area() - 400.0).abs() < 1e-9);
        assert_eq!(s.centroid(), c.centroid());
        assert_eq!(c.scaled(1.0), c);
    }

    #[test]
    fn point_in_circle_is_inclusive() {
        let c = Point::new(0, 0);
        assert!(point_in_circle(Point::new(3, 4), c, 5.0));
        assert!(!point_in_circle(Point::new(3, 5), c, 5.0));
    }

    #[test]
    fn segment_test_only_checks_endpoints() {
        let c = Point::new(0, 0);
        assert!(segment_touches_circle(Point::new(1, 0), Point::new(50, 0), c, 2.0));
        // Passes straight through the center, but both ends are far away.
        assert!(!segment_touches_circle(Point::new(-50, 0), Point::new(50, 0), c, 2.0));
    }

    #[test]
    fn contiguous_ranges_keep_singletons() {
        assert_eq!(
            contiguous_ranges(&[1, 2, 3, 4, 5, 8, 9, 23]),
            vec![1..6, 8..10, 23..24]
        );
        assert!(contiguous_ranges(&[]).is_empty());
        assert_eq!(contiguous_ranges(&[7]), vec![7..8]);
    }

    #[test]
    fn ranges_outside_circle_split_around_hit() {
        let pts = [Point::new(0, 0), Point::new(10, 0), Point::new(20, 0)];
        let center = Point::new(10, 0);
        assert_eq!(indices_in_circle(&pts, center, 1.0), vec![1]);
        assert_eq!(ranges_outside_circle(&pts, center, 1.0), vec![0..1, 2..3]);
        assert!(ranges_outside_circle(&pts, center, 100.0).is_empty());
    }
}
