//! Cut and draw strokes.
//!
//! An unmodified press starts a freehand stroke that collects a point on
//! every move and is committed on release. Shift-clicks draw straight
//! segments in a chain: a shift-click sets the anchor, shift-moves drag
//! the segment end, and the next shift-click commits the segment from
//! the anchor to the last dragged position, which becomes the new
//! anchor. A shift-click with no drag since the anchor just moves the
//! anchor. Releasing a freehand stroke also moves the anchor to its end,
//! so a straight segment can continue from it.

use super::{Modifiers, Preview, Response, ToolContext, ToolHandler};
use crate::annotation::{Stroke, StrokeColor, StrokePath};
use crate::types::Point;

/// Handler shared by the cut and draw modes.
#[derive(Debug)]
pub struct LineTool {
    color: StrokeColor,
    anchor: Option<Point>,
    cursor: Option<Point>,
    freehand: Option<Vec<Point>>,
}

impl LineTool {
    /// A line tool painting `color`.
    #[must_use]
    pub const fn new(color: StrokeColor) -> Self {
        Self {
            color,
            anchor: None,
            cursor: None,
            freehand: None,
        }
    }

    fn commit(&self, ctx: &mut ToolContext<'_>, path: StrokePath) -> Response {
        ctx.history.record(ctx.annotations);
        ctx.annotations.strokes.push(Stroke {
            thickness: ctx.line_thickness,
            color: self.color,
            path,
        });
        log::debug!(
            "committed {:?} stroke ({} total)",
            self.color,
            ctx.annotations.strokes.len()
        );
        Response::recontour()
    }
}

impl ToolHandler for LineTool {
    fn on_press(&mut self, ctx: &mut ToolContext<'_>, at: Point, modifiers: Modifiers) -> Response {
        if !modifiers.shift {
            self.freehand = Some(Vec::new());
            self.cursor = None;
            return Response::none();
        }
        match (self.anchor, self.cursor.take()) {
            (Some(from), Some(to)) => {
                self.anchor = Some(to);
                self.commit(ctx, StrokePath::Straight(from, to))
            }
            _ => {
                self.anchor = Some(at);
                Response::none()
            }
        }
    }

    fn on_move(&mut self, _ctx: &mut ToolContext<'_>, at: Point, modifiers: Modifiers) -> Response {
        if let Some(points) = &mut self.freehand {
            points.push(at);
        } else if modifiers.shift && self.anchor.is_some() {
            self.cursor = Some(at);
        } else {
            self.cursor = None;
        }
        Response::none()
    }

    fn on_release(&mut self, ctx: &mut ToolContext<'_>, at: Point, _: Modifiers) -> Response {
        let Some(points) = self.freehand.take() else {
            return Response::none();
        };
        self.anchor = Some(at);
        if points.is_empty() {
            return Response::none();
        }
        self.commit(ctx, StrokePath::Freehand(points))
    }

    fn preview(&self, line_thickness: u32, _eraser_size: u32) -> Preview {
        if let Some(points) = &self.freehand {
            return Preview::Path {
                points: points.clone(),
                thickness: line_thickness,
                color: Some(self.color),
            };
        }
        match (self.anchor, self.cursor) {
            (Some(from), Some(to)) => Preview::Segment {
                from,
                to,
                thickness: line_thickness,
            },
            _ => Preview::None,
        }
    }
}
