//! Comma-separated measurement report.
//!
//! Layout, one row per exported region:
//!
//! ```text
//! Number,<fiber columns>,g-ratio,
//! 1,<complete fiber>,
//! 2,<orphan axon, other categories blank>,
//! ...
//!
//! Miscellaneous
//! Number,<misc columns>,
//! 7,<misc region>,
//!
//! Complete,Incomplete,<group>,...,Percent Myelinated
//! 3,2,<count>,...,60.0%
//! ```
//!
//! Every cell is followed by a comma, including the last one. Numbering
//! is shared across all sections and only advances for rows that have
//! at least one value. The misc section appears only when a misc column
//! is selected.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use std::fmt::Write;

use myel_core::measure::{FiberMeasurement, Measurements, RegionMeasurement};
use myel_core::{Category, CounterTotals, Metrics};

use crate::selection::{ExportSelection, Quantity, column_label};

const fn pick(metrics: &Metrics, quantity: Quantity) -> f64 {
    match quantity {
        Quantity::Area => metrics.area,
        Quantity::Perimeter => metrics.perimeter,
        Quantity::Diameter => metrics.diameter,
    }
}

const fn fiber_metrics<'m>(fiber: &'m FiberMeasurement<'_>, category: Category) -> &'m Metrics {
    match category {
        Category::InnerMyelin => &fiber.inner,
        Category::OuterMyelin => &fiber.outer,
        Category::Axon | Category::Misc => &fiber.axon,
    }
}

/// Accumulates numbered rows.
struct Rows {
    out: String,
    next: usize,
}

impl Rows {
    /// Write `cells` as a numbered row unless every cell is blank.
    fn push(&mut self, cells: &[Option<f64>]) {
        if !has_values(cells) {
            return;
        }
        self.next += 1;
        let _ = write!(self.out, "{},", self.next);
        for cell in cells {
            if let Some(v) = cell {
                let _ = write!(self.out, "{v}");
            }
            self.out.push(',');
        }
        self.out.push('\n');
    }
}

/// Serialize measurements and counter totals into report text.
///
/// `fibers` and `orphans` follow the order of `measurements`; misc
/// regions are listed after them in their own section.
#[must_use]
pub fn to_csv(
    measurements: &Measurements<'_>,
    counters: &CounterTotals,
    selection: &ExportSelection,
) -> String {
    let columns = selection.fiber_columns();
    let mut rows = Rows {
        out: String::new(),
        next: 0,
    };

    rows.out.push_str("Number,");
    for &(category, quantity) in &columns {
        let _ = write!(rows.out, "{},", column_label(category, quantity));
    }
    if selection.g_ratio {
        rows.out.push_str("g-ratio,");
    }
    rows.out.push('\n');

    for fiber in &measurements.fibers {
        rows.push(&fiber_cells(fiber, &columns, selection));
    }
    for orphan in &measurements.orphans {
        rows.push(&orphan_cells(orphan, &columns, selection));
    }

    if selection.any_misc() {
        rows.out.push_str("\nMiscellaneous\nNumber,");
        let misc_columns = selection.misc_columns();
        for &quantity in &misc_columns {
            let _ = write!(rows.out, "{},", column_label(Category::Misc, quantity));
        }
        rows.out.push('\n');
        for region in &measurements.misc {
            rows.push(&misc_cells(region, &misc_columns));
        }
    }

    let mut out = rows.out;
    out.push('\n');
    out.push_str(&totals(measurements, counters, selection));
    log::debug!("report: {} rows", rows.next);
    out
}

pub(crate) fn fiber_cells(
    fiber: &FiberMeasurement<'_>,
    columns: &[(Category, Quantity)],
    selection: &ExportSelection,
) -> Vec<Option<f64>> {
    let mut cells: Vec<Option<f64>> = columns
        .iter()
        .map(|&(c, q)| Some(pick(fiber_metrics(fiber, c), q)))
        .collect();
    if selection.g_ratio {
        cells.push(fiber.g_ratio);
    }
    cells
}

pub(crate) fn orphan_cells(
    orphan: &RegionMeasurement<'_>,
    columns: &[(Category, Quantity)],
    selection: &ExportSelection,
) -> Vec<Option<f64>> {
    let mut cells: Vec<Option<f64>> = columns
        .iter()
        .map(|&(c, q)| (c == orphan.category).then(|| pick(&orphan.metrics, q)))
        .collect();
    if selection.g_ratio {
        cells.push(None);
    }
    cells
}

pub(crate) fn misc_cells(region: &RegionMeasurement<'_>, columns: &[Quantity]) -> Vec<Option<f64>> {
    columns
        .iter()
        .map(|&q| Some(pick(&region.metrics, q)))
        .collect()
}

/// Whether a row of `cells` is written to the report.
pub(crate) fn has_values(cells: &[Option<f64>]) -> bool {
    cells.iter().any(Option::is_some)
}

/// The two-line totals block.
///
/// `Complete` appears only when there is at least one complete fiber and
/// `Incomplete` only when there are orphans. Counter groups, in order of
/// first placement, and the myelinated percentage follow when counters
/// are selected.
#[must_use]
pub fn totals(
    measurements: &Measurements<'_>,
    counters: &CounterTotals,
    selection: &ExportSelection,
) -> String {
    let mut names = String::new();
    let mut values = String::new();

    let complete = measurements.fibers.len();
    if complete > 0 {
        names.push_str("Complete,");
        let _ = write!(values, "{complete},");
    }
    let incomplete = measurements.orphans.len();
    if incomplete > 0 {
        names.push_str("Incomplete,");
        let _ = write!(values, "{incomplete},");
    }

    if selection.counters {
        for (group, count) in counters.iter() {
            let _ = write!(names, "{group},");
            let _ = write!(values, "{count},");
        }
        names.push_str("Percent Myelinated");
        let _ = write!(values, "{}%", percent(counters.percent_myelinated()));
    }

    format!("{names}\n{values}\n")
}

/// `value` rounded to two decimals in its shortest form, keeping one
/// decimal for whole numbers: `66.67`, `50.0`, `0.0`.
#[allow(clippy::float_cmp)]
fn percent(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.1}")
    } else {
        format!("{rounded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use myel_core::pairing::pair;
    use myel_core::{Annotations, Calibration, Contour, Counter, Point, Quality};

    fn square(cx: i32, cy: i32, half: i32) -> Contour {
        Contour::new(vec![
            Point::new(cx - half, cy - half),
            Point::new(cx + half, cy - half),
            Point::new(cx + half, cy + half),
            Point::new(cx - half, cy + half),
        ])
    }

    fn annotations() -> Annotations {
        let mut a = Annotations::default();
        a.contours.push(Category::Axon, square(50, 50, 5));
        a.contours.push(Category::InnerMyelin, square(50, 50, 10));
        a.contours.push(Category::OuterMyelin, square(50, 50, 20));
        a.contours.push(Category::Axon, square(200, 200, 5));
        a.contours.push(Category::Misc, square(400, 400, 1));
        a.counters = ["Myelinated Axons", "Unmyelinated Axons", "Myelinated Axons"]
            .iter()
            .map(|g| Counter {
                position: Point::new(0, 0),
                group: (*g).to_owned(),
            })
            .collect();
        a
    }

    fn report(selection: &ExportSelection) -> String {
        let a = annotations();
        let pairing = pair(&a.contours);
        let m = myel_core::measure::measure(
            &pairing,
            a.contours.get(Category::Misc),
            &Calibration::new(1.0, Quality::ORIGINAL, 1.0),
        );
        to_csv(&m, &CounterTotals::tally(&a.counters), selection)
    }

    #[test]
    fn areas_and_g_ratio() {
        let selection = ExportSelection {
            axon_area: true,
            outer_area: true,
            g_ratio: true,
            ..ExportSelection::none()
        };
        let text = report(&selection);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Number,Axon Area,Outer Area,g-ratio,");
        assert_eq!(lines[1], "1,100,1600,0.5,");
        assert_eq!(lines[2], "2,100,,,");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Complete,Incomplete,");
        assert_eq!(lines[5], "1,1,");
    }

    #[test]
    fn orphans_without_selected_columns_are_skipped() {
        let selection = ExportSelection {
            outer_perimeter: true,
            ..ExportSelection::none()
        };
        let text = report(&selection);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Number,Outer Perimeter,");
        assert_eq!(lines[1], "1,160,");
        assert_eq!(lines[2], "");
    }

    #[test]
    fn misc_section_continues_numbering() {
        let selection = ExportSelection {
            axon_area: true,
            misc_area: true,
            misc_perimeter: true,
            ..ExportSelection::none()
        };
        let text = report(&selection);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Miscellaneous");
        assert_eq!(lines[5], "Number,Misc. Area,Misc. Perimeter,");
        assert_eq!(lines[6], "3,4,8,");
    }

    #[test]
    fn counter_totals_and_percent() {
        let text = report(&ExportSelection::default());
        let lines: Vec<&str> = text.lines().collect();
        let n = lines.len();
        assert_eq!(
            lines[n - 2],
            "Complete,Incomplete,Myelinated Axons,Unmyelinated Axons,Percent Myelinated"
        );
        assert_eq!(lines[n - 1], "1,1,2,1,66.67%");
    }

    #[test]
    fn empty_session_has_bare_totals() {
        let text = to_csv(
            &Measurements::default(),
            &CounterTotals::default(),
            &ExportSelection::default(),
        );
        assert_eq!(
            text,
            "Number,Axon Diameter,Inner Diameter,Outer Diameter,g-ratio,\n\nPercent Myelinated\n0.0%\n"
        );
    }

    #[test]
    fn percent_uses_shortest_rounded_form() {
        assert_eq!(percent(200.0 / 3.0), "66.67");
        assert_eq!(percent(50.0), "50.0");
        assert_eq!(percent(0.0), "0.0");
        assert_eq!(percent(100.0 / 8.0), "12.5");
        assert_eq!(percent(100.0 / 3.0), "33.33");
    }
}
