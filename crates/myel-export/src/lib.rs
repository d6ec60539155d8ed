//! myel-export: report and overlay serializers (sans-IO)
//!
//! Turns an editor's measurements into the two export artifacts: a
//! comma-separated measurement report and a PNG overlay of the exported
//! regions. Nothing here touches the filesystem; `myel-io` writes the
//! bytes.

pub mod overlay;
pub mod report;
pub mod selection;

use myel_core::{CoreError, CounterTotals, Editor};

pub use overlay::{encode_png, render_overlay};
pub use report::{to_csv, totals};
pub use selection::{ExportSelection, Quantity};

/// Errors from producing export artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The overlay could not be rendered.
    #[error("overlay rendering failed: {0}")]
    Render(#[from] CoreError),

    /// The overlay could not be encoded.
    #[error("overlay encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Report file name for an image stem.
#[must_use]
pub fn report_file_name(stem: &str) -> String {
    format!("{stem}-area_calculations.csv")
}

/// Overlay file name for an image stem.
#[must_use]
pub fn overlay_file_name(stem: &str) -> String {
    format!("{stem}-overlay.png")
}

/// Both export artifacts, ready to write.
#[derive(Debug, Clone)]
pub struct Artifacts {
    /// Report text.
    pub report: String,
    /// PNG-encoded overlay.
    pub overlay_png: Vec<u8>,
}

/// Produce the report and overlay for `editor`'s current state.
///
/// # Errors
///
/// Returns [`ExportError`] if the overlay cannot be rendered or encoded.
pub fn export_artifacts(
    editor: &Editor,
    selection: &ExportSelection,
) -> Result<Artifacts, ExportError> {
    let measurements = editor.measurements();
    let counters = &editor.annotations().counters;
    let report = to_csv(&measurements, &CounterTotals::tally(counters), selection);
    let overlay = render_overlay(
        editor.working_image(),
        &measurements,
        counters,
        selection,
        editor.config().alpha,
    )?;
    let overlay_png = encode_png(&overlay)?;
    log::info!(
        "export: {} fibers, {} orphans, {} misc, {} overlay bytes",
        measurements.fibers.len(),
        measurements.orphans.len(),
        measurements.misc.len(),
        overlay_png.len()
    );
    Ok(Artifacts {
        report,
        overlay_png,
    })
}
