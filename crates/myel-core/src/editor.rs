//! The editor: canonical annotation state plus everything derived from it.
//!
//! [`Editor`] owns the working image, the committed [`Annotations`], the
//! undo history and the active tool handler. Segmentation and pairing
//! are recomputed in full whenever strokes, contours or segmentation
//! parameters change; the rendered frame is cached separately and only
//! re-rendered when something visible changed.

use image::{DynamicImage, GrayImage, RgbaImage};

use crate::annotation::Annotations;
use crate::contour::ContourTracerKind;
use crate::geometry::Contour;
use crate::grayscale;
use crate::history::History;
use crate::measure::{self, Calibration, Measurements, Summary};
use crate::pairing::{self, Pairing};
use crate::pipeline::{self, SegmentParams, Segmentation};
use crate::render::{self, Scene};
use crate::session::SessionFile;
use crate::tools::{
    Highlight, InfoReport, PointerEvent, PointerKind, Response, Tool, ToolContext, ToolHandler,
};
use crate::types::{CoreError, Dimensions, DisplayOptions, EditorConfig};

/// A toggleable overlay layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Contour outlines.
    Outlines,
    /// Fills and hover highlights.
    Highlights,
    /// Count markers.
    Counters,
    /// Cut and draw strokes.
    Lines,
    /// Binarized image as the base.
    Threshold,
}

#[derive(Debug)]
struct CachedFrame {
    hidden_decorations: bool,
    image: RgbaImage,
}

/// Interactive segmentation state for one image.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    display: DisplayOptions,
    filename: Option<String>,
    working: RgbaImage,
    gray: GrayImage,
    tracer: ContourTracerKind,
    annotations: Annotations,
    history: History,
    tool: Tool,
    handler: Box<dyn ToolHandler>,
    highlights: Vec<Highlight>,
    segmentation: Segmentation,
    pairing: Pairing,
    frame: Option<CachedFrame>,
    last_info: Option<InfoReport>,
}

impl Editor {
    /// Decode `bytes` and load it at `config.quality`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] for out-of-range parameters
    /// and the decode errors of [`grayscale::decode`].
    pub fn from_bytes(
        bytes: &[u8],
        filename: Option<String>,
        config: EditorConfig,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let source = grayscale::decode(bytes)?;
        let mut editor = Self::from_image(&source, config)?;
        editor.filename = filename;
        Ok(editor)
    }

    /// Load an already decoded image at `config.quality`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] for out-of-range parameters.
    pub fn from_image(source: &DynamicImage, config: EditorConfig) -> Result<Self, CoreError> {
        let working = grayscale::working_image(source, config.quality);
        Self::from_rgba(working, config)
    }

    /// Use `working` as-is as the working image.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyImage`] if it has no pixels and
    /// [`CoreError::InvalidConfig`] for out-of-range parameters.
    pub fn from_rgba(working: RgbaImage, config: EditorConfig) -> Result<Self, CoreError> {
        config.validate()?;
        if working.width() == 0 || working.height() == 0 {
            return Err(CoreError::EmptyImage);
        }
        let gray = grayscale::to_gray(&working);
        let tracer = ContourTracerKind::default();
        let annotations = Annotations::default();
        let segmentation = pipeline::segment(
            gray.clone(),
            SegmentParams::from(&config),
            &annotations.strokes,
            &tracer,
        );
        let tool = Tool::default();
        log::info!(
            "editor ready: {}x{}, {} candidate contours",
            working.width(),
            working.height(),
            segmentation.available.len()
        );
        Ok(Self {
            handler: tool.handler(),
            tool,
            config,
            display: DisplayOptions::default(),
            filename: None,
            working,
            gray,
            tracer,
            annotations,
            history: History::new(),
            highlights: Vec::new(),
            segmentation,
            pairing: Pairing::default(),
            frame: None,
            last_info: None,
        })
    }

    // ─── Recompute ────────────────────────────────────────────────

    fn recontour(&mut self) {
        self.segmentation = pipeline::segment(
            self.gray.clone(),
            SegmentParams::from(&self.config),
            &self.annotations.strokes,
            &self.tracer,
        );
        self.pairing = pairing::pair(&self.annotations.contours);
        self.frame = None;
        log::debug!(
            "recontoured: {} available, {} triples, {} orphans",
            self.segmentation.available.len(),
            self.pairing.triples.len(),
            self.pairing.orphans.len()
        );
    }

    fn redraw(&mut self) {
        self.frame = None;
    }

    fn apply(&mut self, response: Response) -> Option<InfoReport> {
        if response.recontour {
            self.recontour();
        } else if response.redraw {
            self.redraw();
        }
        if response.info.is_some() {
            self.last_info = response.info;
        }
        response.info
    }

    // ─── Tools ────────────────────────────────────────────────────

    /// Switch mode. Any gesture in progress is dropped.
    pub fn set_tool(&mut self, tool: Tool) {
        match &tool {
            Tool::Cut => self.config.line_thickness = self.config.cut_size,
            Tool::Draw => self.config.line_thickness = self.config.draw_size,
            Tool::Count(group) => self.config.counter_group.clone_from(group),
            _ => {}
        }
        log::debug!("tool {:?} -> {tool:?}", self.tool);
        self.tool = tool;
        self.reset_tool();
    }

    /// Re-enter the current mode, clearing gesture state and highlights.
    pub fn reset_tool(&mut self) {
        self.handler = self.tool.handler();
        if !self.highlights.is_empty() {
            self.highlights.clear();
            self.redraw();
        }
    }

    /// Active mode.
    #[must_use]
    pub const fn tool(&self) -> &Tool {
        &self.tool
    }

    /// Feed one pointer event to the active tool.
    ///
    /// Presses and moves outside the image clear highlights and are
    /// otherwise ignored; releases are always delivered so gestures end.
    /// Returns the report when the info tool was clicked.
    pub fn pointer_event(&mut self, event: PointerEvent) -> Option<InfoReport> {
        if event.kind != PointerKind::Release && !self.dimensions().contains(event.at) {
            if !self.highlights.is_empty() {
                self.highlights.clear();
                self.redraw();
            }
            return None;
        }

        let mut ctx = ToolContext {
            annotations: &mut self.annotations,
            history: &mut self.history,
            available: &self.segmentation.available,
            highlights: &mut self.highlights,
            line_thickness: self.config.line_thickness,
            eraser_size: self.config.eraser_size,
        };
        let response = match event.kind {
            PointerKind::Press => self.handler.on_press(&mut ctx, event.at, event.modifiers),
            PointerKind::Move => self.handler.on_move(&mut ctx, event.at, event.modifiers),
            PointerKind::Release => self.handler.on_release(&mut ctx, event.at, event.modifiers),
        };
        self.apply(response)
    }

    /// Last report produced by the info tool.
    #[must_use]
    pub const fn last_info(&self) -> Option<&InfoReport> {
        self.last_info.as_ref()
    }

    // ─── History ──────────────────────────────────────────────────

    /// Restore the state before the last recorded change.
    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo(&self.annotations) else {
            return false;
        };
        self.annotations = previous;
        self.reset_tool();
        self.recontour();
        true
    }

    /// Re-apply the last undone change.
    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(&self.annotations) else {
            return false;
        };
        self.annotations = next;
        self.reset_tool();
        self.recontour();
        true
    }

    /// Whether [`undo`](Self::undo) would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`redo`](Self::redo) would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Parameters ───────────────────────────────────────────────

    /// Binarization threshold.
    pub fn set_threshold(&mut self, threshold: u8) {
        if self.config.threshold != threshold {
            self.config.threshold = threshold;
            self.recontour();
        }
    }

    /// Smoothing strength; zero disables smoothing.
    pub fn set_blur(&mut self, blur: u32) {
        if self.config.blur != blur {
            self.config.blur = blur;
            self.recontour();
        }
    }

    /// Minimum candidate contour area.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] for NaN.
    pub fn set_min_size(&mut self, min_size: f64) -> Result<(), CoreError> {
        self.update(|c| c.min_size = min_size)?;
        self.recontour();
        Ok(())
    }

    /// Maximum candidate contour area.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] for NaN.
    pub fn set_max_size(&mut self, max_size: f64) -> Result<(), CoreError> {
        self.update(|c| c.max_size = max_size)?;
        self.recontour();
        Ok(())
    }

    /// Overlay opacity.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] outside `[0, 1]`.
    pub fn set_alpha(&mut self, alpha: f64) -> Result<(), CoreError> {
        self.update(|c| c.alpha = alpha)?;
        self.redraw();
        Ok(())
    }

    /// Physical length of one source pixel.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] unless positive.
    pub fn set_calibration(&mut self, calibration: f64) -> Result<(), CoreError> {
        self.update(|c| c.calibration = calibration)
    }

    /// Scale applied to contours at measurement time.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] unless positive.
    pub fn set_correction_scaling(&mut self, scaling: f64) -> Result<(), CoreError> {
        self.update(|c| c.correction_scaling = scaling)
    }

    /// Thickness of new strokes. In cut or draw mode this also becomes
    /// the remembered size for that mode.
    pub fn set_line_thickness(&mut self, thickness: u32) {
        self.config.line_thickness = thickness;
        match self.tool {
            Tool::Cut => self.config.cut_size = thickness,
            Tool::Draw => self.config.draw_size = thickness,
            _ => {}
        }
    }

    /// Contour outline width.
    pub fn set_outline_thickness(&mut self, thickness: u32) {
        self.config.outline_thickness = thickness;
        self.redraw();
    }

    /// Label font size.
    pub fn set_font_size(&mut self, size: f64) {
        self.config.font_size = size;
    }

    /// Eraser radius.
    pub fn set_eraser_size(&mut self, size: u32) {
        self.config.eraser_size = size;
    }

    /// Show or hide an overlay layer.
    pub fn set_layer(&mut self, layer: Layer, on: bool) {
        let slot = match layer {
            Layer::Outlines => &mut self.display.outlines,
            Layer::Highlights => &mut self.display.highlights,
            Layer::Counters => &mut self.display.counters,
            Layer::Lines => &mut self.display.lines,
            Layer::Threshold => &mut self.display.threshold,
        };
        if *slot != on {
            *slot = on;
            self.redraw();
        }
    }

    /// Apply `change` to a copy of the config and keep it if it validates.
    fn update(&mut self, change: impl FnOnce(&mut EditorConfig)) -> Result<(), CoreError> {
        let mut next = self.config.clone();
        change(&mut next);
        next.validate()?;
        self.config = next;
        Ok(())
    }

    // ─── Accessors ────────────────────────────────────────────────

    /// Current parameters.
    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Layer toggles.
    #[must_use]
    pub const fn display(&self) -> DisplayOptions {
        self.display
    }

    /// Source image name recorded in sessions.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Working image size.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.working.width(),
            height: self.working.height(),
        }
    }

    /// The image being annotated.
    #[must_use]
    pub const fn working_image(&self) -> &RgbaImage {
        &self.working
    }

    /// Committed state.
    #[must_use]
    pub const fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Contours currently offered for selection.
    #[must_use]
    pub fn available(&self) -> &[Contour] {
        &self.segmentation.available
    }

    /// Latest segmentation pass.
    #[must_use]
    pub const fn segmentation(&self) -> &Segmentation {
        &self.segmentation
    }

    /// Latest pairing of the committed fiber contours.
    #[must_use]
    pub const fn pairing(&self) -> &Pairing {
        &self.pairing
    }

    /// Hover highlights.
    #[must_use]
    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// Measurement calibration for the current parameters.
    #[must_use]
    pub fn calibration(&self) -> Calibration {
        Calibration::from(&self.config)
    }

    /// Measure complete fibers, orphans and misc regions.
    #[must_use]
    pub fn measurements(&self) -> Measurements<'_> {
        measure::measure(
            &self.pairing,
            self.annotations.contours.get(crate::annotation::Category::Misc),
            &self.calibration(),
        )
    }

    /// Headline counts.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::new(&self.annotations, &self.pairing)
    }

    // ─── Rendering ────────────────────────────────────────────────

    /// The frame to display: the cached composite plus the preview of
    /// any gesture in progress.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Render`] if a canvas cannot be allocated.
    pub fn frame(&mut self) -> Result<RgbaImage, CoreError> {
        let hidden = self.handler.hides_decorations();
        let stale = self
            .frame
            .as_ref()
            .is_none_or(|f| f.hidden_decorations != hidden);
        if stale {
            let image = self.render_frame(hidden)?;
            self.frame = Some(CachedFrame {
                hidden_decorations: hidden,
                image,
            });
        }
        let preview = self
            .handler
            .preview(self.config.line_thickness, self.config.eraser_size);
        match &self.frame {
            Some(cached) => render::draw_preview(&cached.image, &preview, self.display.lines),
            None => Err(CoreError::Render {
                width: self.working.width(),
                height: self.working.height(),
            }),
        }
    }

    fn render_frame(&self, hide_decorations: bool) -> Result<RgbaImage, CoreError> {
        let threshold_base;
        let base = if self.display.threshold {
            threshold_base = DynamicImage::ImageLuma8(self.segmentation.binary.clone()).to_rgba8();
            &threshold_base
        } else {
            &self.working
        };
        render::render_scene(&Scene {
            base,
            available: &self.segmentation.available,
            annotations: &self.annotations,
            pairing: &self.pairing,
            highlights: &self.highlights,
            display: self.display,
            alpha: self.config.alpha,
            outline_thickness: self.config.outline_thickness,
            hide_decorations,
        })
    }

    // ─── Sessions ─────────────────────────────────────────────────

    /// Snapshot everything a session file holds.
    #[must_use]
    pub fn to_session(&self) -> SessionFile {
        SessionFile::capture(&self.config, &self.annotations, self.filename.clone())
    }

    /// Apply the keys present in `session` to this editor.
    ///
    /// Contours are replaced when the file has a `contours` key; strokes
    /// and counters are replaced by the file's, or cleared when the key
    /// is absent. Undo history is dropped. Quality is ignored since the
    /// image is already loaded.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the file's parameters are
    /// out of range; nothing is changed in that case.
    pub fn apply_session(&mut self, session: &SessionFile) -> Result<(), CoreError> {
        let mut config = self.config.clone();
        session.apply_config(&mut config);
        config.validate()?;
        self.config = config;

        if let Some(store) = session.contour_store() {
            self.annotations.contours = store;
        }
        self.annotations.strokes = session.strokes().unwrap_or_default();
        self.annotations.counters = session.counters().unwrap_or_default();
        if let Some(name) = &session.filename {
            self.filename = Some(name.clone());
        }
        self.history.clear();
        self.last_info = None;
        self.reset_tool();
        self.recontour();
        log::info!(
            "session applied: {} contours, {} strokes, {} counters",
            self.annotations.contours.len(),
            self.annotations.strokes.len(),
            self.annotations.counters.len()
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::annotation::Category;
    use crate::tools::Modifiers;
    use image::Rgba;

    /// Dark background with bright discs, the shape of stained fibers.
    fn discs(w: u32, h: u32, centers: &[(i32, i32, i32)]) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            let inside = centers.iter().any(|&(cx, cy, r)| {
                let dx = i64::from(x) - i64::from(cx);
                let dy = i64::from(y) - i64::from(cy);
                dx * dx + dy * dy <= i64::from(r * r)
            });
            if inside {
                Rgba([230, 230, 230, 255])
            } else {
                Rgba([20, 20, 20, 255])
            }
        })
    }

    fn config() -> EditorConfig {
        EditorConfig {
            blur: 0,
            min_size: 50.0,
            ..EditorConfig::default()
        }
    }

    fn editor() -> Editor {
        Editor::from_rgba(discs(120, 80, &[(30, 40, 15), (85, 40, 15)]), config()).unwrap()
    }

    fn click(e: &mut Editor, x: i32, y: i32, modifiers: Modifiers) -> Option<InfoReport> {
        e.pointer_event(PointerEvent::new(PointerKind::Press, x, y, modifiers));
        e.pointer_event(PointerEvent::new(PointerKind::Release, x, y, modifiers))
    }

    #[test]
    fn discs_become_candidates() {
        assert_eq!(editor().available().len(), 2);
    }

    #[test]
    fn empty_image_is_rejected() {
        assert!(matches!(
            Editor::from_rgba(RgbaImage::new(0, 4), config()),
            Err(CoreError::EmptyImage)
        ));
    }

    #[test]
    fn click_commits_and_undo_restores() {
        let mut e = editor();
        click(&mut e, 30, 40, Modifiers::NONE);
        assert_eq!(e.annotations().contours.get(Category::Axon).len(), 1);
        assert_eq!(e.pairing().orphans.axon.len(), 1);
        assert!(e.can_undo());

        assert!(e.undo());
        assert!(e.annotations().contours.is_empty());
        assert!(e.pairing().orphans.is_empty());
        assert!(e.can_redo());

        assert!(e.redo());
        assert_eq!(e.annotations().contours.len(), 1);
        assert!(!e.redo());
    }

    #[test]
    fn draw_stroke_splits_candidate() {
        let mut e = editor();
        e.set_tool(Tool::Draw);
        e.set_line_thickness(3);
        click(&mut e, 30, 10, Modifiers::SHIFT);
        e.pointer_event(PointerEvent::new(PointerKind::Move, 30, 70, Modifiers::SHIFT));
        click(&mut e, 30, 70, Modifiers::SHIFT);
        assert_eq!(e.annotations().strokes.len(), 1);
        assert_eq!(e.available().len(), 3);
        assert_eq!(e.config().draw_size, 3);
        assert!(e.undo());
        assert_eq!(e.available().len(), 2);
    }

    #[test]
    fn tool_switch_loads_remembered_sizes() {
        let mut e = editor();
        e.set_tool(Tool::Draw);
        assert_eq!(e.config().line_thickness, EditorConfig::DEFAULT_DRAW_SIZE);
        e.set_line_thickness(7);
        e.set_tool(Tool::Cut);
        assert_eq!(e.config().line_thickness, EditorConfig::DEFAULT_CUT_SIZE);
        e.set_tool(Tool::Draw);
        assert_eq!(e.config().line_thickness, 7);
    }

    #[test]
    fn count_tool_records_group() {
        let mut e = editor();
        e.set_tool(Tool::Count("Schwann".to_owned()));
        assert_eq!(e.config().counter_group, "Schwann");
        click(&mut e, 5, 5, Modifiers::NONE);
        assert_eq!(e.annotations().counters[0].group, "Schwann");
        assert_eq!(e.summary().counters.get("Schwann"), 1);
    }

    #[test]
    fn info_tool_reports() {
        let mut e = editor();
        click(&mut e, 30, 40, Modifiers::NONE);
        e.set_tool(Tool::Info);
        let report = e
            .pointer_event(PointerEvent::new(PointerKind::Press, 30, 40, Modifiers::NONE))
            .unwrap();
        assert_eq!(report.axons, 1);
        assert!(!report.is_complete());
        assert_eq!(e.last_info(), Some(&report));
    }

    #[test]
    fn out_of_bounds_moves_clear_highlights() {
        let mut e = editor();
        e.pointer_event(PointerEvent::new(PointerKind::Move, 30, 40, Modifiers::NONE));
        assert_eq!(e.highlights().len(), 1);
        e.pointer_event(PointerEvent::new(PointerKind::Move, -5, 40, Modifiers::NONE));
        assert!(e.highlights().is_empty());
    }

    #[test]
    fn invalid_alpha_is_refused() {
        let mut e = editor();
        assert!(e.set_alpha(1.5).is_err());
        assert!((e.config().alpha - EditorConfig::DEFAULT_ALPHA).abs() < f64::EPSILON);
        assert!(e.set_alpha(0.8).is_ok());
    }

    #[test]
    fn frame_matches_working_size() {
        let mut e = editor();
        let frame = e.frame().unwrap();
        assert_eq!(frame.dimensions(), (120, 80));
        e.set_layer(Layer::Threshold, true);
        let thresholded = e.frame().unwrap();
        assert_eq!(thresholded.dimensions(), (120, 80));
    }

    #[test]
    fn eraser_preview_does_not_touch_cache() {
        let mut e = editor();
        let plain = e.frame().unwrap();
        e.set_tool(Tool::Erase);
        e.pointer_event(PointerEvent::new(PointerKind::Move, 60, 40, Modifiers::NONE));
        let with_ring = e.frame().unwrap();
        assert_ne!(plain, with_ring);
        e.set_tool(Tool::Erase);
        assert_eq!(e.frame().unwrap(), plain);
    }

    #[test]
    fn session_round_trip_restores_state() {
        let mut e = editor();
        click(&mut e, 30, 40, Modifiers::NONE);
        e.set_tool(Tool::Count(crate::types::MYELINATED_GROUP.to_owned()));
        click(&mut e, 85, 40, Modifiers::NONE);
        e.set_threshold(100);
        let session = SessionFile::parse(&e.to_session().to_json().unwrap()).unwrap();

        let mut fresh = editor();
        fresh.apply_session(&session).unwrap();
        assert_eq!(fresh.annotations(), e.annotations());
        assert_eq!(fresh.config().threshold, 100);
        assert!(!fresh.can_undo());
    }

    #[test]
    fn bad_session_parameters_change_nothing() {
        let mut e = editor();
        click(&mut e, 30, 40, Modifiers::NONE);
        let before = e.annotations().clone();
        let session = SessionFile {
            alpha: Some(4.0),
            counters: Some(Vec::new()),
            ..SessionFile::default()
        };
        assert!(e.apply_session(&session).is_err());
        assert_eq!(e.annotations(), &before);
        assert!((e.config().alpha - EditorConfig::DEFAULT_ALPHA).abs() < f64::EPSILON);
    }
}
