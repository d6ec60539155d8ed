//! Session file schema.
//!
//! A session is a JSON object. Every key is optional on read; only the
//! keys present are applied. The `version` key is the exception: it
//! must be present and listed in [`COMPATIBLE_VERSIONS`] or the file is
//! rejected before anything else is looked at.
//!
//! ```json
//! {
//!   "version": "2.0",
//!   "filename": "slide-04.tif",
//!   "quality": 1.0,
//!   "threshold": 122,
//!   "contours": { "axon": [[[10, 10], [20, 10], [20, 20]]] },
//!   "lines": [[2, [255, 255, 255], [[1, 1], [2, 2]]],
//!             [1, [0, 0, 0], [[[0, 0], [9, 9]]]]],
//!   "counters": [[[40, 40], "Myelinated Axons"]]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::annotation::{Annotations, Category, ContourStore, Counter, Stroke, StrokeColor, StrokePath};
use crate::geometry::Contour;
use crate::types::{EditorConfig, Point, Quality};

/// Version stamped on files this crate writes.
pub const SESSION_VERSION: &str = "2.0";

/// Versions whose files can be read.
pub const COMPATIBLE_VERSIONS: [&str; 12] = [
    "0.1", "0.2", "0.3", "0.4", "0.5", "0.6", "0.7", "1.0", "1.1", "1.2", "1.3", "2.0",
];

/// Errors reading a session file.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Not valid JSON, or a key holds the wrong shape.
    #[error("session file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Valid JSON, but not an object.
    #[error("session file is not a JSON object")]
    NotAnObject,

    /// Version missing or not in [`COMPATIBLE_VERSIONS`].
    #[error("incompatible session version: {}", .0.as_deref().unwrap_or("none"))]
    IncompatibleVersion(Option<String>),
}

/// Stroke geometry as stored: one straight segment wrapped in a list, or
/// a plain point list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum PathRecord {
    Straight([[Point; 2]; 1]),
    Freehand(Vec<Point>),
}

/// `[thickness, [b, g, r], path]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord(u32, [u8; 3], PathRecord);

impl From<&Stroke> for LineRecord {
    fn from(stroke: &Stroke) -> Self {
        let path = match &stroke.path {
            StrokePath::Straight(a, b) => PathRecord::Straight([[*a, *b]]),
            StrokePath::Freehand(points) => PathRecord::Freehand(points.clone()),
        };
        Self(stroke.thickness, stroke.color.channels(), path)
    }
}

impl From<LineRecord> for Stroke {
    fn from(LineRecord(thickness, channels, path): LineRecord) -> Self {
        let path = match path {
            PathRecord::Straight([[a, b]]) => StrokePath::Straight(a, b),
            PathRecord::Freehand(points) => StrokePath::Freehand(points),
        };
        Self {
            thickness,
            color: StrokeColor::from_channels(channels),
            path,
        }
    }
}

/// `[[x, y], "group"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRecord(Point, String);

/// The persisted session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionFile {
    /// Writer version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Source image path as given when the session was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Working resolution factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline_thickness: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_thickness: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eraser_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cut_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw_size: Option<u32>,
    /// Committed contours by category key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contours: Option<BTreeMap<String, Vec<Contour>>>,
    /// Cut and draw strokes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<LineRecord>>,
    /// Count markers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counters: Option<Vec<CounterRecord>>,
}

impl SessionFile {
    /// Parse and version-check session text.
    ///
    /// # Errors
    ///
    /// [`SessionError::Malformed`] or [`SessionError::NotAnObject`] when
    /// the text is not a session object, and
    /// [`SessionError::IncompatibleVersion`] when the version is missing
    /// or unknown.
    pub fn parse(text: &str) -> Result<Self, SessionError> {
        let mut value: serde_json::Value = serde_json::from_str(text)?;
        let object = value.as_object_mut().ok_or(SessionError::NotAnObject)?;
        let version = object.get("version").map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        match version {
            Some(v) if COMPATIBLE_VERSIONS.contains(&v.as_str()) => {
                // Early writers stored the version as a bare number.
                object.insert("version".to_owned(), serde_json::Value::String(v));
            }
            other => {
                log::warn!("rejecting session with version {other:?}");
                return Err(SessionError::IncompatibleVersion(other));
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Malformed`] if a value cannot be
    /// represented in JSON (a non-finite float).
    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Snapshot the full editor state.
    #[must_use]
    pub fn capture(
        config: &EditorConfig,
        annotations: &Annotations,
        filename: Option<String>,
    ) -> Self {
        let contours = Category::ALL
            .into_iter()
            .map(|cat| {
                (
                    cat.key().to_owned(),
                    annotations.contours.get(cat).to_vec(),
                )
            })
            .collect();
        Self {
            version: Some(SESSION_VERSION.to_owned()),
            filename,
            quality: Some(config.quality.factor()),
            threshold: Some(config.threshold),
            blur: Some(config.blur),
            min_size: Some(config.min_size),
            max_size: Some(config.max_size),
            alpha: Some(config.alpha),
            calibration: Some(config.calibration),
            outline_thickness: Some(config.outline_thickness),
            font_size: Some(config.font_size),
            line_thickness: Some(config.line_thickness),
            eraser_size: Some(config.eraser_size),
            cut_size: Some(config.cut_size),
            draw_size: Some(config.draw_size),
            contours: Some(contours),
            lines: Some(annotations.strokes.iter().map(LineRecord::from).collect()),
            counters: Some(
                annotations
                    .counters
                    .iter()
                    .map(|c| CounterRecord(c.position, c.group.clone()))
                    .collect(),
            ),
        }
    }

    /// Working quality, if present and in range.
    #[must_use]
    pub fn quality(&self) -> Option<Quality> {
        self.quality.and_then(|q| Quality::new(q).ok())
    }

    /// Copy the present numeric parameters into `config`. Quality is not
    /// touched: it only matters when the image is loaded.
    pub fn apply_config(&self, config: &mut EditorConfig) {
        fn set<T: Copy>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }
        set(&mut config.threshold, self.threshold);
        set(&mut config.blur, self.blur);
        set(&mut config.min_size, self.min_size);
        set(&mut config.max_size, self.max_size);
        set(&mut config.alpha, self.alpha);
        set(&mut config.calibration, self.calibration);
        set(&mut config.outline_thickness, self.outline_thickness);
        set(&mut config.font_size, self.font_size);
        set(&mut config.line_thickness, self.line_thickness);
        set(&mut config.eraser_size, self.eraser_size);
        set(&mut config.cut_size, self.cut_size);
        set(&mut config.draw_size, self.draw_size);
    }

    /// Committed contours with legacy keys remapped, if the file has any.
    ///
    /// Categories missing from the map come back empty. When a legacy key
    /// and its canonical key are both present the legacy entry wins.
    /// Unknown keys are dropped.
    #[must_use]
    pub fn contour_store(&self) -> Option<ContourStore> {
        let map = self.contours.as_ref()?;
        let mut store = ContourStore::new();
        let (legacy, canonical): (Vec<_>, Vec<_>) =
            map.iter().partition(|(key, _)| Category::is_legacy_key(key));
        for (key, contours) in canonical.into_iter().chain(legacy) {
            match Category::from_key(key) {
                Some(cat) => store.set(cat, contours.clone()),
                None => log::warn!("ignoring contours under unknown key {key:?}"),
            }
        }
        Some(store)
    }

    /// Strokes, if the file has a `lines` key.
    #[must_use]
    pub fn strokes(&self) -> Option<Vec<Stroke>> {
        self.lines
            .as_ref()
            .map(|lines| lines.iter().cloned().map(Stroke::from).collect())
    }

    /// Counters, if the file has a `counters` key.
    #[must_use]
    pub fn counters(&self) -> Option<Vec<Counter>> {
        self.counters.as_ref().map(|records| {
            records
                .iter()
                .map(|CounterRecord(position, group)| Counter {
                    position: *position,
                    group: group.clone(),
                })
                .collect()
        })
    }
}
