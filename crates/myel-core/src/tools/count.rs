//! Place count markers.

use super::{Modifiers, Preview, Response, ToolContext, ToolHandler};
use crate::annotation::Counter;
use crate::types::Point;

/// Handler for count mode, bound to one group.
#[derive(Debug)]
pub struct CountTool {
    group: String,
    cursor: Option<Point>,
}

impl CountTool {
    /// Count into `group`.
    #[must_use]
    pub const fn new(group: String) -> Self {
        Self {
            group,
            cursor: None,
        }
    }
}

impl ToolHandler for CountTool {
    fn on_press(&mut self, ctx: &mut ToolContext<'_>, at: Point, _: Modifiers) -> Response {
        ctx.history.record(ctx.annotations);
        ctx.annotations.counters.push(Counter {
            position: at,
            group: self.group.clone(),
        });
        log::debug!("counter {} placed in {:?}", ctx.annotations.counters.len(), self.group);
        Response::redraw()
    }

    fn on_move(&mut self, _ctx: &mut ToolContext<'_>, at: Point, _: Modifiers) -> Response {
        self.cursor = Some(at);
        Response::none()
    }

    fn on_release(&mut self, _ctx: &mut ToolContext<'_>, _at: Point, _: Modifiers) -> Response {
        Response::none()
    }

    fn preview(&self, _line_thickness: u32, _eraser_size: u32) -> Preview {
        self.cursor.map_or(Preview::None, |at| Preview::Dot {
            at,
            group: self.group.clone(),
        })
    }
}
