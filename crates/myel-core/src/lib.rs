//! myel-core: segmentation and annotation engine for nerve fiber
//! cross-sections (sans-IO).
//!
//! A working image is turned into candidate region contours through:
//! grayscale -> bilateral smoothing -> two-stage threshold -> stroke
//! burn-in -> border following -> size filter.
//!
//! The user commits candidates (or traces new ones) as axon, inner
//! myelin, outer myelin or misc regions. Committed fiber contours are
//! grouped into complete (outer, inner, axon) triples and orphans, and
//! measured in physical units for export.
//!
//! This crate has **no I/O dependencies**: images arrive as bytes,
//! sessions as text, and frames leave as in-memory rasters. Filesystem
//! interaction lives in `myel-io`.

pub mod annotation;
pub mod blur;
pub mod contour;
pub mod editor;
pub mod eraser;
pub mod geometry;
pub mod grayscale;
pub mod history;
pub mod mask;
pub mod measure;
pub mod pairing;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod threshold;
pub mod tools;
pub mod types;

pub use annotation::{Annotations, Category, ContourStore, Counter, Stroke, StrokeColor, StrokePath};
pub use contour::{ContourTracer, ContourTracerKind};
pub use editor::{Editor, Layer};
pub use geometry::Contour;
pub use measure::{Calibration, CounterTotals, Measurements, Metrics, Summary};
pub use pairing::{Pairing, Triple};
pub use session::{SessionError, SessionFile};
pub use tools::{InfoReport, Modifiers, PointerEvent, PointerKind, Tool};
pub use types::{
    CoreError, Dimensions, DisplayOptions, EditorConfig, MYELINATED_GROUP, Point, Quality,
    UNMYELINATED_GROUP,
};
