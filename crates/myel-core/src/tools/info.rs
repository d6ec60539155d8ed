//! Report how complete the fiber under the pointer is.

use std::fmt;

use super::{Modifiers, Response, ToolContext, ToolHandler};
use crate::annotation::{Category, ContourStore};
use crate::types::Point;

/// Counts of committed fiber contours strictly containing a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InfoReport {
    /// Axons around the point.
    pub axons: usize,
    /// Inner myelin boundaries around the point.
    pub inner: usize,
    /// Outer myelin boundaries around the point.
    pub outer: usize,
}

impl InfoReport {
    /// Count committed contours around `at`.
    #[must_use]
    pub fn at(store: &ContourStore, at: Point) -> Self {
        let count = |cat| store.get(cat).iter().filter(|c| c.contains(at)).count();
        Self {
            axons: count(Category::Axon),
            inner: count(Category::InnerMyelin),
            outer: count(Category::OuterMyelin),
        }
    }

    /// Exactly one of each boundary.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.axons == 1 && self.inner == 1 && self.outer == 1
    }

    /// Human-readable summary, one finding per line.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for InfoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_complete() {
            return f.write_str("This selection is complete!");
        }
        f.write_str("This selection is incomplete")?;

        let too_many: Vec<String> = [
            (self.axons, "axons"),
            (self.inner, "inner myelin sheaths"),
            (self.outer, "outer myelin sheaths"),
        ]
        .into_iter()
        .filter(|(n, _)| *n > 1)
        .map(|(n, what)| format!("{what} ({n})"))
        .collect();
        if !too_many.is_empty() {
            write!(f, "\nToo many: {}", too_many.join(", "))?;
        }

        let missing: Vec<&str> = [
            (self.axons, "axon"),
            (self.inner, "inner myelin sheath"),
            (self.outer, "outer myelin sheath"),
        ]
        .into_iter()
        .filter(|(n, _)| *n == 0)
        .map(|(_, what)| what)
        .collect();
        if !missing.is_empty() {
            write!(f, "\nMissing: {}", missing.join(", "))?;
        }
        Ok(())
    }
}

/// Handler for info mode.
#[derive(Debug, Default)]
pub struct InfoTool;

impl ToolHandler for InfoTool {
    fn on_press(&mut self, ctx: &mut ToolContext<'_>, at: Point, _: Modifiers) -> Response {
        Response {
            info: Some(InfoReport::at(&ctx.annotations.contours, at)),
            ..Response::none()
        }
    }

    fn on_move(&mut self, _ctx: &mut ToolContext<'_>, _at: Point, _: Modifiers) -> Response {
        Response::none()
    }

    fn on_release(&mut self, _ctx: &mut ToolContext<'_>, _at: Point, _: Modifiers) -> Response {
        Response::none()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{Harness, octagon};
    use super::*;

    #[test]
    fn complete_fiber_reports_complete() {
        let mut h = Harness::default();
        h.annotations.contours.push(Category::Axon, octagon(50, 50, 10));
        h.annotations
            .contours
            .push(Category::InnerMyelin, octagon(50, 50, 14));
        h.annotations
            .contours
            .push(Category::OuterMyelin, octagon(50, 50, 20));
        let r = InfoTool.on_press(&mut h.ctx(), Point::new(50, 50), Modifiers::NONE);
        let report = r.info.unwrap_or_default();
        assert!(report.is_complete());
        assert_eq!(report.message(), "This selection is complete!");
    }

    #[test]
    fn missing_and_extra_are_listed() {
        let report = InfoReport {
            axons: 2,
            inner: 0,
            outer: 0,
        };
        assert_eq!(
            report.message(),
            "This selection is incomplete\nToo many: axons (2)\nMissing: inner myelin sheath, outer myelin sheath"
        );
    }

    #[test]
    fn empty_point_misses_everything() {
        let report = InfoReport::at(&ContourStore::new(), Point::new(0, 0));
        assert_eq!(
            report.message(),
            "This selection is incomplete\nMissing: axon, inner myelin sheath, outer myelin sheath"
        );
    }

    #[test]
    fn info_does_not_touch_history() {
        let mut h = Harness::default();
        InfoTool.on_press(&mut h.ctx(), Point::new(0, 0), Modifiers::NONE);
        assert!(!h.history.can_undo());
    }
}
