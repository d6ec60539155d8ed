//! Remove committed contours under the pointer, in every category.

use super::{Highlight, HighlightKind, Modifiers, Response, ToolContext, ToolHandler};
use crate::types::Point;

/// Handler for deselect mode.
#[derive(Debug, Default)]
pub struct DeselectTool;

impl ToolHandler for DeselectTool {
    fn on_press(&mut self, ctx: &mut ToolContext<'_>, at: Point, _: Modifiers) -> Response {
        if !ctx.annotations.contours.iter().any(|(_, c)| c.contains(at)) {
            return Response::none();
        }
        ctx.history.record(ctx.annotations);
        let dropped = ctx.annotations.contours.retain(|_, c| !c.contains(at));
        ctx.set_highlights(Vec::new());
        log::debug!("deselected {dropped} contours");
        Response::recontour()
    }

    fn on_move(&mut self, ctx: &mut ToolContext<'_>, at: Point, _: Modifiers) -> Response {
        let hits = ctx
            .annotations
            .contours
            .iter()
            .filter(|(_, c)| c.contains(at))
            .map(|(_, c)| Highlight {
                contour: c.clone(),
                kind: HighlightKind::Committed,
            })
            .collect();
        let changed = ctx.set_highlights(hits);
        Response::redraw_if(changed)
    }

    fn on_release(&mut self, _ctx: &mut ToolContext<'_>, _at: Point, _: Modifiers) -> Response {
        Response::none()
    }
}
