//! Circular eraser over strokes and counters.
//!
//! Counters under the eraser are removed. Straight strokes and
//! single-point strokes are removed whole when an endpoint is under the
//! eraser. Freehand strokes lose the vertices under the eraser and are
//! split into one stroke per surviving run of consecutive vertices, each
//! keeping the original thickness and colour.
//!
//! Contours are never touched by the eraser.

use crate::annotation::{Annotations, Counter, Stroke, StrokePath};
use crate::geometry::{point_in_circle, ranges_outside_circle, segment_touches_circle};
use crate::types::Point;

/// What one eraser application removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EraseOutcome {
    /// Counters removed.
    pub counters: usize,
    /// Strokes removed whole.
    pub strokes: usize,
    /// Stroke vertices removed from freehand strokes.
    pub vertices: usize,
}

impl EraseOutcome {
    /// Returns `true` if nothing was removed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.counters == 0 && self.strokes == 0 && self.vertices == 0
    }

    /// Whether any stroke geometry changed, which invalidates the mask.
    #[must_use]
    pub const fn touched_strokes(&self) -> bool {
        self.strokes > 0 || self.vertices > 0
    }
}

/// Erase everything under the circle at `center`.
pub fn erase(annotations: &mut Annotations, center: Point, radius: f64) -> EraseOutcome {
    let mut outcome = EraseOutcome::default();

    let before = annotations.counters.len();
    annotations
        .counters
        .retain(|c: &Counter| !point_in_circle(c.position, center, radius));
    outcome.counters = before - annotations.counters.len();

    let strokes = std::mem::take(&mut annotations.strokes);
    for stroke in strokes {
        match &stroke.path {
            StrokePath::Straight(a, b) => {
                if segment_touches_circle(*a, *b, center, radius) {
                    outcome.strokes += 1;
                } else {
                    annotations.strokes.push(stroke);
                }
            }
            StrokePath::Freehand(points) if points.len() <= 1 => {
                if points.iter().any(|p| point_in_circle(*p, center, radius)) {
                    outcome.strokes += 1;
                } else {
                    annotations.strokes.push(stroke);
                }
            }
            StrokePath::Freehand(points) => {
                let runs = ranges_outside_circle(points, center, radius);
                let surviving: usize = runs.iter().map(std::ops::Range::len).sum();
                if surviving == points.len() {
                    annotations.strokes.push(stroke);
                    continue;
                }
                outcome.vertices += points.len() - surviving;
                if runs.is_empty() {
                    outcome.strokes += 1;
                }
                for run in runs {
                    annotations.strokes.push(Stroke {
                        thickness: stroke.thickness,
                        color: stroke.color,
                        path: StrokePath::Freehand(points[run].to_vec()),
                    });
                }
            }
        }
    }

    if !outcome.is_empty() {
        log::debug!(
            "erased at ({}, {}) r={radius}: {outcome:?}",
            center.x,
            center.y
        );
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::StrokeColor;

    fn freehand(points: &[(i32, i32)]) -> Stroke {
        Stroke {
            thickness: 3,
            color: StrokeColor::Draw,
            path: StrokePath::Freehand(points.iter().map(|&(x, y)| Point::new(x, y)).collect()),
        }
    }

    fn counter(x: i32, y: i32) -> Counter {
        Counter {
            position: Point::new(x, y),
            group: "Myelinated Axons".to_owned(),
        }
    }

    #[test]
    fn counters_inside_circle_are_removed() {
        let mut a = Annotations {
            counters: vec![counter(0, 0), counter(5, 0), counter(6, 0)],
            ..Annotations::default()
        };
        let out = erase(&mut a, Point::new(0, 0), 5.0);
        assert_eq!(out.counters, 2);
        assert_eq!(a.counters, vec![counter(6, 0)]);
    }

    #[test]
    fn middle_of_three_point_stroke_splits_in_two() {
        let original = freehand(&[(0, 0), (10, 0), (20, 0)]);
        let mut a = Annotations {
            strokes: vec![original.clone()],
            ..Annotations::default()
        };
        let out = erase(&mut a, Point::new(10, 0), 2.0);
        assert_eq!(out.vertices, 1);
        assert_eq!(a.strokes.len(), 2);
        let total: usize = a.strokes.iter().map(|s| s.path.points().len()).sum();
        assert_eq!(total, 3 - 1);
        for s in &a.strokes {
            assert_eq!(s.thickness, original.thickness);
            assert_eq!(s.color, original.color);
        }
        assert_eq!(a.strokes[0], freehand(&[(0, 0)]));
        assert_eq!(a.strokes[1], freehand(&[(20, 0)]));
    }

    #[test]
    fn erasing_twice_removes_nothing_the_second_time() {
        let mut a = Annotations {
            strokes: vec![
                freehand(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 0)]),
                Stroke {
                    thickness: 1,
                    color: StrokeColor::Cut,
                    path: StrokePath::Straight(Point::new(3, 1), Point::new(40, 40)),
                },
            ],
            counters: vec![counter(3, 2), counter(30, 30)],
            ..Annotations::default()
        };
        let first = erase(&mut a, Point::new(3, 0), 1.5);
        assert!(!first.is_empty());
        let snapshot = a.clone();
        let second = erase(&mut a, Point::new(3, 0), 1.5);
        assert!(second.is_empty());
        assert_eq!(a, snapshot);
    }

    #[test]
    fn straight_stroke_needs_endpoint_under_eraser() {
        let through = Stroke {
            thickness: 1,
            color: StrokeColor::Cut,
            path: StrokePath::Straight(Point::new(-50, 0), Point::new(50, 0)),
        };
        let mut a = Annotations {
            strokes: vec![through.clone()],
            ..Annotations::default()
        };
        assert!(erase(&mut a, Point::new(0, 0), 5.0).is_empty());
        assert_eq!(a.strokes, vec![through]);

        let out = erase(&mut a, Point::new(49, 0), 5.0);
        assert_eq!(out.strokes, 1);
        assert!(a.strokes.is_empty());
    }

    #[test]
    fn single_point_stroke_is_removed_whole() {
        let mut a = Annotations {
            strokes: vec![freehand(&[(4, 4)])],
            ..Annotations::default()
        };
        let out = erase(&mut a, Point::new(5, 5), 2.0);
        assert_eq!(out.strokes, 1);
        assert!(a.strokes.is_empty());
    }

    #[test]
    fn fully_covered_freehand_disappears() {
        let mut a = Annotations {
            strokes: vec![freehand(&[(0, 0), (1, 1), (2, 2)])],
            ..Annotations::default()
        };
        let out = erase(&mut a, Point::new(1, 1), 10.0);
        assert_eq!(out.strokes, 1);
        assert_eq!(out.vertices, 3);
        assert!(a.strokes.is_empty());
        assert!(out.touched_strokes());
    }

    #[test]
    fn contours_are_untouched() {
        use crate::annotation::Category;
        use crate::geometry::Contour;
        let mut a = Annotations::default();
        a.contours.push(
            Category::Axon,
            Contour::new(vec![Point::new(0, 0), Point::new(2, 0), Point::new(0, 2)]),
        );
        assert!(erase(&mut a, Point::new(0, 0), 50.0).is_empty());
        assert_eq!(a.contours.len(), 1);
    }
}
