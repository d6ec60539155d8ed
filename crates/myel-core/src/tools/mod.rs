//! Pointer-driven editing tools.
//!
//! Each [`Tool`] has its own [`ToolHandler`] that owns the in-progress
//! gesture state for that mode. The editor swaps the handler wholesale
//! when the tool changes, so no gesture state survives a mode switch.
//!
//! Handlers receive a [`ToolContext`] borrowing exactly the state they
//! may touch and report back through a [`Response`] which caches the
//! editor must invalidate.

mod count;
mod deselect;
mod erase;
mod info;
mod line;
mod select;

use crate::annotation::{Annotations, Category, StrokeColor};
use crate::geometry::Contour;
use crate::history::History;
use crate::types::{MYELINATED_GROUP, Point, UNMYELINATED_GROUP};

pub use count::CountTool;
pub use deselect::DeselectTool;
pub use erase::EraseTool;
pub use info::{InfoReport, InfoTool};
pub use line::LineTool;
pub use select::SelectTool;

/// Pointer travel, in pixels, after which a select press turns into a
/// freehand trace.
pub const TRACE_ACTIVATION_DISTANCE: f64 = 3.0;

/// Editing mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tool {
    /// Commit or trace contours into a category.
    Select(Category),
    /// Remove committed contours under the pointer.
    Deselect,
    /// Report which fiber boundaries surround a point.
    Info,
    /// Paint separating strokes.
    Cut,
    /// Paint joining strokes.
    Draw,
    /// Remove strokes and counters.
    Erase,
    /// Place markers in the named group.
    Count(String),
}

impl Default for Tool {
    fn default() -> Self {
        Self::Select(Category::Axon)
    }
}

impl Tool {
    /// Keyboard shortcut mapping.
    #[must_use]
    pub fn from_hotkey(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            '1' => Some(Self::Select(Category::Axon)),
            '2' => Some(Self::Select(Category::InnerMyelin)),
            '3' => Some(Self::Select(Category::OuterMyelin)),
            '4' => Some(Self::Deselect),
            '5' => Some(Self::Info),
            '6' => Some(Self::Select(Category::Misc)),
            'q' => Some(Self::Cut),
            'w' => Some(Self::Draw),
            'e' => Some(Self::Erase),
            'r' => Some(Self::Count(UNMYELINATED_GROUP.to_owned())),
            't' => Some(Self::Count(MYELINATED_GROUP.to_owned())),
            _ => None,
        }
    }

    /// Stroke colour painted by this tool, if it paints strokes.
    #[must_use]
    pub const fn stroke_color(&self) -> Option<StrokeColor> {
        match self {
            Self::Cut => Some(StrokeColor::Cut),
            Self::Draw => Some(StrokeColor::Draw),
            _ => None,
        }
    }

    /// A fresh handler with no gesture in progress.
    #[must_use]
    pub fn handler(&self) -> Box<dyn ToolHandler> {
        match self {
            Self::Select(category) => Box::new(SelectTool::new(*category)),
            Self::Deselect => Box::new(DeselectTool),
            Self::Info => Box::new(InfoTool),
            Self::Cut => Box::new(LineTool::new(StrokeColor::Cut)),
            Self::Draw => Box::new(LineTool::new(StrokeColor::Draw)),
            Self::Erase => Box::new(EraseTool::default()),
            Self::Count(group) => Box::new(CountTool::new(group.clone())),
        }
    }
}

/// Keyboard modifiers held during a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Shift is held.
    pub shift: bool,
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self { shift: false };
    /// Shift only.
    pub const SHIFT: Self = Self { shift: true };
}

/// Kind of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Primary button went down.
    Press,
    /// Pointer moved, with or without the button held.
    Move,
    /// Primary button went up.
    Release,
}

/// A pointer event in working-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// What happened.
    pub kind: PointerKind,
    /// Where.
    pub at: Point,
    /// Held modifiers.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Build an event.
    #[must_use]
    pub const fn new(kind: PointerKind, x: i32, y: i32, modifiers: Modifiers) -> Self {
        Self {
            kind,
            at: Point::new(x, y),
            modifiers,
        }
    }
}

/// Why a contour is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    /// Already committed; clicking would remove it.
    Committed,
    /// In the selection pool; clicking would commit it.
    Available,
}

/// A hover highlight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    /// The highlighted contour.
    pub contour: Contour,
    /// Which colour to use.
    pub kind: HighlightKind,
}

/// State a tool handler may read and mutate.
pub struct ToolContext<'a> {
    /// Canonical annotation state.
    pub annotations: &'a mut Annotations,
    /// Undo/redo stacks. Record before mutating.
    pub history: &'a mut History,
    /// Current selection pool.
    pub available: &'a [Contour],
    /// Hover highlights shown on the next frame.
    pub highlights: &'a mut Vec<Highlight>,
    /// Thickness for new strokes.
    pub line_thickness: u32,
    /// Eraser radius.
    pub eraser_size: u32,
}

impl ToolContext<'_> {
    /// Replace the highlights, returning whether they changed.
    pub fn set_highlights(&mut self, highlights: Vec<Highlight>) -> bool {
        if *self.highlights == highlights {
            false
        } else {
            *self.highlights = highlights;
            true
        }
    }
}

/// What the editor must do after an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Strokes or contours changed: rerun segmentation and pairing.
    pub recontour: bool,
    /// Something visible changed: re-render the cached frame.
    pub redraw: bool,
    /// Report produced by the info tool.
    pub info: Option<InfoReport>,
}

impl Response {
    /// Nothing to do.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Re-render only.
    #[must_use]
    pub fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    /// Recompute everything and re-render.
    #[must_use]
    pub fn recontour() -> Self {
        Self {
            recontour: true,
            redraw: true,
            info: None,
        }
    }

    /// Re-render when `changed`, otherwise nothing.
    #[must_use]
    pub fn redraw_if(changed: bool) -> Self {
        if changed { Self::redraw() } else { Self::none() }
    }
}

/// Transient drawing laid over the cached frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// Nothing in progress.
    None,
    /// Straight line from the chain anchor to the cursor.
    Segment {
        /// Chain anchor.
        from: Point,
        /// Cursor.
        to: Point,
        /// Stroke width.
        thickness: u32,
    },
    /// An open path being traced or drawn.
    Path {
        /// Vertices so far.
        points: Vec<Point>,
        /// Stroke width.
        thickness: u32,
        /// Stroke colour for line tools; `None` for selection traces.
        color: Option<StrokeColor>,
    },
    /// A counter about to be placed.
    Dot {
        /// Cursor.
        at: Point,
        /// Group the dot would join.
        group: String,
    },
    /// The eraser outline.
    Ring {
        /// Cursor.
        center: Point,
        /// Eraser radius.
        radius: u32,
    },
}

/// Per-mode pointer handling.
pub trait ToolHandler: std::fmt::Debug {
    /// Primary button pressed at `at`.
    fn on_press(&mut self, ctx: &mut ToolContext<'_>, at: Point, modifiers: Modifiers)
    -> Response;

    /// Pointer moved to `at`.
    fn on_move(&mut self, ctx: &mut ToolContext<'_>, at: Point, modifiers: Modifiers) -> Response;

    /// Primary button released at `at`.
    fn on_release(
        &mut self,
        ctx: &mut ToolContext<'_>,
        at: Point,
        modifiers: Modifiers,
    ) -> Response;

    /// Gesture preview to draw over the cached frame.
    fn preview(&self, line_thickness: u32, eraser_size: u32) -> Preview {
        let _ = (line_thickness, eraser_size);
        Preview::None
    }

    /// Whether overlay decorations should be hidden while this gesture
    /// is in progress.
    fn hides_decorations(&self) -> bool {
        false
    }
}

/// Smallest-area contour in `contours` strictly containing `at`.
pub(crate) fn smallest_containing(contours: &[Contour], at: Point) -> Option<&Contour> {
    contours
        .iter()
        .filter(|c| c.contains(at))
        .min_by(|a, b| a.area().total_cmp(&b.area()))
}
