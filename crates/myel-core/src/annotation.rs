//! Canonical editing state: committed contours, strokes and counters.
//!
//! [`Annotations`] is everything undo/redo and session files care
//! about. Derived data (the selection pool, pairing) is never stored
//! here.

use serde::{Deserialize, Serialize};

use crate::geometry::Contour;
use crate::types::Point;

/// The four contour categories a selection can be committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Innermost boundary of a fiber.
    Axon,
    /// Inner boundary of the myelin sheath.
    InnerMyelin,
    /// Outer boundary of the myelin sheath.
    OuterMyelin,
    /// Anything else worth measuring.
    Misc,
}

impl Category {
    /// All categories in storage order.
    pub const ALL: [Self; 4] = [Self::Axon, Self::InnerMyelin, Self::OuterMyelin, Self::Misc];

    /// The three categories that make up a fiber.
    pub const FIBER: [Self; 3] = [Self::Axon, Self::InnerMyelin, Self::OuterMyelin];

    /// Key used in session files.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Axon => "axon",
            Self::InnerMyelin => "inner myelin",
            Self::OuterMyelin => "outer myelin",
            Self::Misc => "misc",
        }
    }

    /// Parse a session key, including the keys written by old versions.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "axon" | "Axon" => Some(Self::Axon),
            "inner myelin" | "Myelin_In" => Some(Self::InnerMyelin),
            "outer myelin" | "Myelin_Out" => Some(Self::OuterMyelin),
            "misc" => Some(Self::Misc),
            _ => None,
        }
    }

    /// Whether `key` is one of the pre-1.0 key spellings.
    #[must_use]
    pub fn is_legacy_key(key: &str) -> bool {
        matches!(key, "Axon" | "Myelin_In" | "Myelin_Out")
    }

    const fn index(self) -> usize {
        match self {
            Self::Axon => 0,
            Self::InnerMyelin => 1,
            Self::OuterMyelin => 2,
            Self::Misc => 3,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Committed contours per category, in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContourStore([Vec<Contour>; 4]);

impl ContourStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Contours committed to `category`.
    #[must_use]
    pub fn get(&self, category: Category) -> &[Contour] {
        &self.0[category.index()]
    }

    /// Replace every contour of `category`.
    pub fn set(&mut self, category: Category, contours: Vec<Contour>) {
        self.0[category.index()] = contours;
    }

    /// Append a contour to `category`.
    pub fn push(&mut self, category: Category, contour: Contour) {
        self.0[category.index()].push(contour);
    }

    /// Remove the contour at `index` of `category`.
    pub fn remove(&mut self, category: Category, index: usize) -> Option<Contour> {
        let list = &mut self.0[category.index()];
        (index < list.len()).then(|| list.remove(index))
    }

    /// Keep only contours for which `keep` returns `true`, across all
    /// categories. Returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(Category, &Contour) -> bool) -> usize {
        let mut dropped = 0;
        for category in Category::ALL {
            let list = &mut self.0[category.index()];
            let before = list.len();
            list.retain(|c| keep(category, c));
            dropped += before - list.len();
        }
        dropped
    }

    /// Iterate `(category, contour)` in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &Contour)> {
        Category::ALL
            .into_iter()
            .flat_map(move |cat| self.get(cat).iter().map(move |c| (cat, c)))
    }

    /// Total number of committed contours.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    /// Returns `true` if nothing is committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Vec::is_empty)
    }
}

/// How a stroke affects the binary mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrokeColor {
    /// Painted as foreground (white), separating regions.
    Cut,
    /// Painted as background (black), joining regions.
    Draw,
}

impl StrokeColor {
    /// Mask intensity the stroke is burned with.
    #[must_use]
    pub const fn intensity(self) -> u8 {
        match self {
            Self::Cut => 255,
            Self::Draw => 0,
        }
    }

    /// Three-channel colour as stored in session files.
    #[must_use]
    pub const fn channels(self) -> [u8; 3] {
        let v = self.intensity();
        [v, v, v]
    }

    /// Decode a stored colour. Bright colours are cuts, dark are draws.
    #[must_use]
    pub fn from_channels(channels: [u8; 3]) -> Self {
        let sum: u32 = channels.iter().map(|&c| u32::from(c)).sum();
        if sum >= 3 * 128 { Self::Cut } else { Self::Draw }
    }
}

/// Geometry of a stroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrokePath {
    /// Points recorded while dragging.
    Freehand(Vec<Point>),
    /// A segment between two shift-clicks.
    Straight(Point, Point),
}

impl StrokePath {
    /// The polyline vertices, in drawing order.
    #[must_use]
    pub fn points(&self) -> Vec<Point> {
        match self {
            Self::Freehand(points) => points.clone(),
            Self::Straight(a, b) => vec![*a, *b],
        }
    }
}

/// A cut or draw annotation burned into the mask before tracing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stroke {
    /// Line width in working pixels.
    pub thickness: u32,
    /// Cut or draw.
    pub color: StrokeColor,
    /// Where the stroke goes.
    pub path: StrokePath,
}

/// A point marker tagged with a counting group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    /// Where the marker sits.
    pub position: Point,
    /// Group label, e.g. `"Myelinated Axons"`.
    pub group: String,
}

/// All user-authored state that undo, redo and sessions capture.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Annotations {
    /// Committed contours.
    pub contours: ContourStore,
    /// Cut and draw strokes, in drawing order.
    pub strokes: Vec<Stroke>,
    /// Count markers, in placement order.
    pub counters: Vec<Counter>,
}
