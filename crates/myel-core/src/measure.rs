//! Physical measurements of committed contours.
//!
//! Areas scale with the square of the per-pixel length, perimeters and
//! diameters linearly. The per-pixel length is the configured
//! calibration divided by the working quality, since the working image
//! was downsampled by that factor. Diameters are equivalent-circle
//! diameters, `2 * sqrt(area / pi)`.

use std::f64::consts::PI;

use serde::Serialize;

use crate::annotation::{Annotations, Category, Counter};
use crate::geometry::Contour;
use crate::pairing::{Pairing, Triple};
use crate::types::{EditorConfig, MYELINATED_GROUP, Quality, UNMYELINATED_GROUP};

/// Conversion from working pixels to physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Physical length of one working-image pixel.
    pub length_per_pixel: f64,
    /// Centroid-relative scale applied to each contour before measuring.
    pub correction_scaling: f64,
}

impl Calibration {
    /// Calibration for an image loaded at `quality`.
    #[must_use]
    pub fn new(calibration: f64, quality: Quality, correction_scaling: f64) -> Self {
        Self {
            length_per_pixel: calibration / quality.factor(),
            correction_scaling,
        }
    }
}

impl From<&EditorConfig> for Calibration {
    fn from(config: &EditorConfig) -> Self {
        Self::new(
            config.calibration,
            config.quality,
            config.correction_scaling,
        )
    }
}

/// Area, perimeter and equivalent diameter of one contour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    /// Enclosed area.
    pub area: f64,
    /// Closed perimeter.
    pub perimeter: f64,
    /// Diameter of the circle with the same area.
    pub diameter: f64,
}

impl Metrics {
    /// Measure `contour`.
    #[must_use]
    pub fn of(contour: &Contour, calibration: &Calibration) -> Self {
        let scaled = contour.scaled(calibration.correction_scaling);
        let k = calibration.length_per_pixel;
        let area = scaled.area() * k * k;
        Self {
            area,
            perimeter: scaled.perimeter() * k,
            diameter: equivalent_diameter(area),
        }
    }
}

/// `2 * sqrt(area / pi)`.
#[must_use]
pub fn equivalent_diameter(area: f64) -> f64 {
    (area / PI).sqrt() * 2.0
}

/// `sqrt(inner / outer)`, or `None` when the outer area is zero.
#[must_use]
pub fn g_ratio(inner_area: f64, outer_area: f64) -> Option<f64> {
    (outer_area > 0.0).then(|| (inner_area / outer_area).sqrt())
}

/// One complete fiber.
#[derive(Debug, Clone)]
pub struct FiberMeasurement<'a> {
    /// The paired contours.
    pub triple: &'a Triple,
    /// Axon metrics.
    pub axon: Metrics,
    /// Inner myelin boundary metrics.
    pub inner: Metrics,
    /// Outer myelin boundary metrics.
    pub outer: Metrics,
    /// `sqrt(inner area / outer area)`.
    pub g_ratio: Option<f64>,
}

/// One stand-alone contour: an orphan or a misc region.
#[derive(Debug, Clone)]
pub struct RegionMeasurement<'a> {
    /// Category the contour was committed under.
    pub category: Category,
    /// The contour in working coordinates.
    pub contour: &'a Contour,
    /// Its metrics.
    pub metrics: Metrics,
}

/// Every measurement an export needs, in report order.
#[derive(Debug, Clone, Default)]
pub struct Measurements<'a> {
    /// Complete fibers, in pairing order.
    pub fibers: Vec<FiberMeasurement<'a>>,
    /// Orphan axons, then orphan inner, then orphan outer boundaries.
    pub orphans: Vec<RegionMeasurement<'a>>,
    /// Misc regions in selection order.
    pub misc: Vec<RegionMeasurement<'a>>,
}

/// Measure a pairing and the misc contours.
#[must_use]
pub fn measure<'a>(
    pairing: &'a Pairing,
    misc: &'a [Contour],
    calibration: &Calibration,
) -> Measurements<'a> {
    let fibers = pairing
        .triples
        .iter()
        .map(|triple| {
            let outer = Metrics::of(triple.outer(), calibration);
            let inner = Metrics::of(triple.inner(), calibration);
            FiberMeasurement {
                triple,
                axon: Metrics::of(triple.axon(), calibration),
                inner,
                outer,
                g_ratio: g_ratio(inner.area, outer.area),
            }
        })
        .collect();
    let region = |category, contour| RegionMeasurement {
        category,
        contour,
        metrics: Metrics::of(contour, calibration),
    };
    let orphans = pairing
        .orphans
        .iter()
        .map(|(category, contour)| region(category, contour))
        .collect();
    let misc = misc.iter().map(|c| region(Category::Misc, c)).collect();
    Measurements {
        fibers,
        orphans,
        misc,
    }
}

/// Counter totals per group, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CounterTotals(Vec<(String, usize)>);

impl CounterTotals {
    /// Tally `counters`.
    #[must_use]
    pub fn tally(counters: &[Counter]) -> Self {
        let mut totals: Vec<(String, usize)> = Vec::new();
        for counter in counters {
            match totals.iter_mut().find(|(g, _)| *g == counter.group) {
                Some((_, n)) => *n += 1,
                None => totals.push((counter.group.clone(), 1)),
            }
        }
        Self(totals)
    }

    /// Count for `group`, zero if absent.
    #[must_use]
    pub fn get(&self, group: &str) -> usize {
        self.0
            .iter()
            .find(|(g, _)| g == group)
            .map_or(0, |(_, n)| *n)
    }

    /// `(group, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(g, n)| (g.as_str(), *n))
    }

    /// Returns `true` if no counters were placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Myelinated share of the two preset groups, as a percentage.
    /// Zero when neither group has counters.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent_myelinated(&self) -> f64 {
        let myelinated = self.get(MYELINATED_GROUP) as f64;
        let total = myelinated + self.get(UNMYELINATED_GROUP) as f64;
        if total == 0.0 {
            0.0
        } else {
            myelinated / total * 100.0
        }
    }
}

/// Headline numbers for a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Complete fibers.
    pub complete: usize,
    /// Fiber contours not in a complete triple.
    pub incomplete: usize,
    /// Misc regions.
    pub misc: usize,
    /// Counter totals.
    pub counters: CounterTotals,
    /// See [`CounterTotals::percent_myelinated`].
    pub percent_myelinated: f64,
}

impl Summary {
    /// Summarise committed state and its pairing.
    #[must_use]
    pub fn new(annotations: &Annotations, pairing: &Pairing) -> Self {
        let counters = CounterTotals::tally(&annotations.counters);
        Self {
            complete: pairing.triples.len(),
            incomplete: pairing.orphans.len(),
            misc: annotations.contours.get(Category::Misc).len(),
            percent_myelinated: counters.percent_myelinated(),
            counters,
        }
    }
}
