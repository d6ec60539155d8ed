//! Commit, uncommit or trace contours into one category.
//!
//! A press records an anchor. Releasing without travelling more than
//! [`TRACE_ACTIVATION_DISTANCE`] is a click: a committed contour of this
//! category under the pointer is removed, otherwise the smallest pool
//! contour under the pointer is committed. Travelling further starts a
//! freehand trace whose polygon is committed on release if it encloses
//! any area.

use super::{
    Highlight, HighlightKind, Modifiers, Preview, Response, TRACE_ACTIVATION_DISTANCE,
    ToolContext, ToolHandler, smallest_containing,
};
use crate::annotation::Category;
use crate::geometry::Contour;
use crate::types::Point;

/// Handler for the four select modes.
#[derive(Debug)]
pub struct SelectTool {
    category: Category,
    anchor: Option<Point>,
    trace: Option<Vec<Point>>,
}

impl SelectTool {
    /// Select into `category`.
    #[must_use]
    pub const fn new(category: Category) -> Self {
        Self {
            category,
            anchor: None,
            trace: None,
        }
    }

    fn click(&self, ctx: &mut ToolContext<'_>, at: Point) -> Response {
        let committed = ctx.annotations.contours.get(self.category);
        if let Some(index) = committed.iter().position(|c| c.contains(at)) {
            ctx.history.record(ctx.annotations);
            ctx.annotations.contours.remove(self.category, index);
            log::debug!("uncommitted {} contour {index}", self.category);
            return Response::recontour();
        }

        if let Some(contour) = smallest_containing(ctx.available, at) {
            let contour = contour.clone();
            ctx.history.record(ctx.annotations);
            ctx.annotations.contours.push(self.category, contour);
            log::debug!("committed {} contour", self.category);
            return Response::recontour();
        }

        Response::none()
    }

    fn finish_trace(&self, ctx: &mut ToolContext<'_>, points: Vec<Point>) -> Response {
        let contour = Contour::new(points);
        if contour.area() > 0.0 {
            ctx.history.record(ctx.annotations);
            ctx.annotations.contours.push(self.category, contour);
            log::debug!("committed traced {} contour", self.category);
        } else {
            log::debug!("discarded zero-area trace");
        }
        Response::recontour()
    }

    fn hover(&self, ctx: &mut ToolContext<'_>, at: Point) -> Response {
        let highlight = smallest_containing(ctx.annotations.contours.get(self.category), at)
            .map(|c| Highlight {
                contour: c.clone(),
                kind: HighlightKind::Committed,
            })
            .or_else(|| {
                smallest_containing(ctx.available, at).map(|c| Highlight {
                    contour: c.clone(),
                    kind: HighlightKind::Available,
                })
            });
        let changed = ctx.set_highlights(highlight.into_iter().collect());
        Response::redraw_if(changed)
    }
}

impl ToolHandler for SelectTool {
    fn on_press(&mut self, _ctx: &mut ToolContext<'_>, at: Point, _: Modifiers) -> Response {
        self.anchor = Some(at);
        self.trace = None;
        Response::none()
    }

    fn on_move(&mut self, ctx: &mut ToolContext<'_>, at: Point, _: Modifiers) -> Response {
        if let Some(trace) = &mut self.trace {
            trace.push(at);
            return Response::none();
        }

        if let Some(anchor) = self.anchor
            && anchor.distance(at) > TRACE_ACTIVATION_DISTANCE
        {
            self.trace = Some(vec![anchor, at]);
            self.anchor = None;
            ctx.set_highlights(Vec::new());
            return Response::redraw();
        }

        if self.anchor.is_some() {
            return Response::none();
        }
        self.hover(ctx, at)
    }

    fn on_release(&mut self, ctx: &mut ToolContext<'_>, at: Point, _: Modifiers) -> Response {
        if let Some(points) = self.trace.take() {
            self.anchor = None;
            return self.finish_trace(ctx, points);
        }
        if self.anchor.take().is_none() {
            return Response::none();
        }
        self.click(ctx, at)
    }

    fn preview(&self, line_thickness: u32, _eraser_size: u32) -> Preview {
        self.trace.as_ref().map_or(Preview::None, |points| Preview::Path {
            points: points.clone(),
            thickness: line_thickness,
            color: None,
        })
    }

    fn hides_decorations(&self) -> bool {
        self.trace.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{Harness, octagon};
    use super::*;

    const N: Modifiers = Modifiers::NONE;

    fn click(tool: &mut SelectTool, h: &mut Harness, x: i32, y: i32) -> Response {
        let at = Point::new(x, y);
        tool.on_press(&mut h.ctx(), at, N);
        tool.on_release(&mut h.ctx(), at, N)
    }

    #[test]
    fn click_commits_smallest_pool_contour() {
        let mut h = Harness {
            available: vec![octagon(50, 50, 30), octagon(50, 50, 10)],
            ..Harness::default()
        };
        let mut tool = SelectTool::new(Category::Axon);
        let r = click(&mut tool, &mut h, 50, 50);
        assert!(r.recontour);
        assert_eq!(
            h.annotations.contours.get(Category::Axon),
            &[octagon(50, 50, 10)]
        );
        assert_eq!(h.history.undo_len(), 1);
    }

    #[test]
    fn click_on_committed_removes_it() {
        let mut h = Harness {
            available: vec![octagon(50, 50, 10)],
            ..Harness::default()
        };
        h.annotations
            .contours
            .push(Category::Misc, octagon(50, 50, 10));
        let mut tool = SelectTool::new(Category::Misc);
        click(&mut tool, &mut h, 50, 50);
        assert!(h.annotations.contours.get(Category::Misc).is_empty());
    }

    #[test]
    fn click_on_nothing_changes_nothing() {
        let mut h = Harness::default();
        let mut tool = SelectTool::new(Category::Axon);
        let r = click(&mut tool, &mut h, 5, 5);
        assert_eq!(r, Response::none());
        assert!(!h.history.can_undo());
    }

    #[test]
    fn small_wobble_is_still_a_click() {
        let mut h = Harness {
            available: vec![octagon(50, 50, 10)],
            ..Harness::default()
        };
        let mut tool = SelectTool::new(Category::Axon);
        tool.on_press(&mut h.ctx(), Point::new(50, 50), N);
        tool.on_move(&mut h.ctx(), Point::new(52, 51), N);
        assert!(!tool.hides_decorations());
        tool.on_release(&mut h.ctx(), Point::new(52, 51), N);
        assert_eq!(h.annotations.contours.get(Category::Axon).len(), 1);
    }

    #[test]
    fn drag_traces_a_new_contour() {
        let mut h = Harness::default();
        let mut tool = SelectTool::new(Category::OuterMyelin);
        tool.on_press(&mut h.ctx(), Point::new(10, 10), N);
        let r = tool.on_move(&mut h.ctx(), Point::new(30, 10), N);
        assert!(r.redraw);
        assert!(tool.hides_decorations());
        tool.on_move(&mut h.ctx(), Point::new(30, 30), N);
        tool.on_move(&mut h.ctx(), Point::new(10, 30), N);
        assert!(matches!(tool.preview(1, 1), Preview::Path { ref points, .. } if points.len() == 4));
        let r = tool.on_release(&mut h.ctx(), Point::new(10, 30), N);
        assert!(r.recontour);
        assert!(!tool.hides_decorations());
        let traced = h.annotations.contours.get(Category::OuterMyelin);
        assert_eq!(traced.len(), 1);
        assert!((traced[0].area() - 400.0).abs() < 1e-9);
    }

    #[test]
    fn zero_area_trace_is_discarded() {
        let mut h = Harness::default();
        let mut tool = SelectTool::new(Category::Axon);
        tool.on_press(&mut h.ctx(), Point::new(0, 0), N);
        tool.on_move(&mut h.ctx(), Point::new(10, 0), N);
        tool.on_move(&mut h.ctx(), Point::new(20, 0), N);
        tool.on_release(&mut h.ctx(), Point::new(20, 0), N);
        assert!(h.annotations.contours.is_empty());
        assert!(!h.history.can_undo());
    }

    #[test]
    fn hover_prefers_committed_then_pool() {
        let mut h = Harness {
            available: vec![octagon(50, 50, 10), octagon(150, 50, 10)],
            ..Harness::default()
        };
        h.annotations
            .contours
            .push(Category::Axon, octagon(50, 50, 12));
        let mut tool = SelectTool::new(Category::Axon);

        let r = tool.on_move(&mut h.ctx(), Point::new(50, 50), N);
        assert!(r.redraw);
        assert_eq!(h.highlights[0].kind, HighlightKind::Committed);

        tool.on_move(&mut h.ctx(), Point::new(150, 50), N);
        assert_eq!(h.highlights[0].kind, HighlightKind::Available);

        // Same highlight again does not force a redraw.
        let r = tool.on_move(&mut h.ctx(), Point::new(151, 50), N);
        assert!(!r.redraw);

        tool.on_move(&mut h.ctx(), Point::new(300, 300), N);
        assert!(h.highlights.is_empty());
    }
}
