//! Continuous circular erasure.
//!
//! The eraser runs at the press point and at every move while the button
//! is held. Undo is recorded once per gesture, just before the first
//! removal, so a sweep that removes nothing leaves history untouched.

use super::{Modifiers, Preview, Response, ToolContext, ToolHandler};
use crate::eraser::erase;
use crate::types::Point;

/// Handler for erase mode.
#[derive(Debug, Default)]
pub struct EraseTool {
    active: bool,
    recorded: bool,
    removed_strokes: bool,
    cursor: Option<Point>,
}

impl EraseTool {
    fn sweep(&mut self, ctx: &mut ToolContext<'_>, at: Point) -> Response {
        let radius = f64::from(ctx.eraser_size);
        let outcome = if self.recorded {
            erase(ctx.annotations, at, radius)
        } else {
            let before = ctx.annotations.clone();
            let outcome = erase(ctx.annotations, at, radius);
            if !outcome.is_empty() {
                ctx.history.record(&before);
                self.recorded = true;
            }
            outcome
        };
        if outcome.is_empty() {
            return Response::none();
        }
        self.removed_strokes |= outcome.touched_strokes();
        Response::redraw()
    }
}

impl ToolHandler for EraseTool {
    fn on_press(&mut self, ctx: &mut ToolContext<'_>, at: Point, _: Modifiers) -> Response {
        self.active = true;
        self.recorded = false;
        self.removed_strokes = false;
        self.cursor = Some(at);
        self.sweep(ctx, at)
    }

    fn on_move(&mut self, ctx: &mut ToolContext<'_>, at: Point, _: Modifiers) -> Response {
        self.cursor = Some(at);
        if self.active {
            self.sweep(ctx, at)
        } else {
            Response::none()
        }
    }

    fn on_release(&mut self, _ctx: &mut ToolContext<'_>, at: Point, _: Modifiers) -> Response {
        self.cursor = Some(at);
        if !std::mem::take(&mut self.active) {
            return Response::none();
        }
        if std::mem::take(&mut self.removed_strokes) {
            Response::recontour()
        } else {
            Response::redraw()
        }
    }

    fn preview(&self, _line_thickness: u32, eraser_size: u32) -> Preview {
        self.cursor.map_or(Preview::None, |center| Preview::Ring {
            center,
            radius: eraser_size,
        })
    }
}
