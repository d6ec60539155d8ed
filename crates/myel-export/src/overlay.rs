//! Annotated overlay raster.
//!
//! Every region that produced a report row is filled (cyan for complete
//! fibers and misc regions, orange for orphans) and outlined in black on
//! a copy of the working image. The copy is blended over the original at
//! the display alpha, and counter markers are painted on top when
//! counters are exported.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use myel_core::measure::Measurements;
use myel_core::render::{Canvas, Color, blend, palette};
use myel_core::{Contour, CoreError, Counter};

use crate::report::{fiber_cells, has_values, misc_cells, orphan_cells};
use crate::selection::ExportSelection;

const OUTLINE_WIDTH: u32 = 1;

fn paint_region(canvas: &mut Canvas, contour: &Contour, fill: Color) {
    canvas.fill_contour(contour, fill);
    canvas.outline_contour(contour, palette::BLACK, OUTLINE_WIDTH);
}

/// Render the export overlay for `base`.
///
/// # Errors
///
/// Returns [`CoreError::Render`] if `base` has no pixels.
pub fn render_overlay(
    base: &RgbaImage,
    measurements: &Measurements<'_>,
    counters: &[Counter],
    selection: &ExportSelection,
    alpha: f64,
) -> Result<RgbaImage, CoreError> {
    let mut canvas = Canvas::from_rgba(base)?;
    let columns = selection.fiber_columns();

    for fiber in &measurements.fibers {
        if has_values(&fiber_cells(fiber, &columns, selection)) {
            for member in fiber.triple.members() {
                paint_region(&mut canvas, member, palette::CYAN_HIGHLIGHT);
            }
        }
    }
    for orphan in &measurements.orphans {
        if has_values(&orphan_cells(orphan, &columns, selection)) {
            paint_region(&mut canvas, orphan.contour, palette::ORANGE_HIGHLIGHT);
        }
    }
    let misc_columns = selection.misc_columns();
    for region in &measurements.misc {
        if has_values(&misc_cells(region, &misc_columns)) {
            paint_region(&mut canvas, region.contour, palette::CYAN_HIGHLIGHT);
        }
    }

    let blended = blend(&canvas.into_rgba()?, base, alpha);
    if !selection.counters || counters.is_empty() {
        return Ok(blended);
    }

    let mut canvas = Canvas::from_rgba(&blended)?;
    for counter in counters {
        canvas.counter(counter.position, &counter.group);
    }
    canvas.into_rgba()
}

/// Encode an RGBA raster as PNG bytes.
///
/// # Errors
///
/// Returns [`image::ImageError`] if encoding fails.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(buf)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use myel_core::measure::measure;
    use myel_core::pairing::pair;
    use myel_core::{Calibration, Category, ContourStore, Point, Quality};

    fn square(cx: i32, cy: i32, half: i32) -> Contour {
        Contour::new(vec![
            Point::new(cx - half, cy - half),
            Point::new(cx + half, cy - half),
            Point::new(cx + half, cy + half),
            Point::new(cx - half, cy + half),
        ])
    }

    fn gray(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba([100, 100, 100, 255]))
    }

    fn store() -> ContourStore {
        let mut store = ContourStore::new();
        store.push(Category::Axon, square(20, 20, 10));
        store.push(Category::Misc, square(60, 20, 10));
        store
    }

    #[test]
    fn orphan_is_orange_when_exported() {
        let store = store();
        let pairing = pair(&store);
        let m = measure(
            &pairing,
            store.get(Category::Misc),
            &Calibration::new(1.0, Quality::ORIGINAL, 1.0),
        );
        let selection = ExportSelection {
            axon_area: true,
            ..ExportSelection::none()
        };
        let out = render_overlay(&gray(80, 40), &m, &[], &selection, 1.0).unwrap();
        assert_eq!(out.get_pixel(20, 20).0, [255, 153, 0, 255]);
        // Misc not selected, so left alone.
        assert_eq!(out.get_pixel(60, 20).0, [100, 100, 100, 255]);
    }

    #[test]
    fn alpha_zero_keeps_base_but_counters_sit_on_top() {
        let store = store();
        let pairing = pair(&store);
        let m = measure(
            &pairing,
            store.get(Category::Misc),
            &Calibration::new(1.0, Quality::ORIGINAL, 1.0),
        );
        let counters = [Counter {
            position: Point::new(5, 35),
            group: myel_core::MYELINATED_GROUP.to_owned(),
        }];
        let out =
            render_overlay(&gray(80, 40), &m, &counters, &ExportSelection::all(), 0.0).unwrap();
        assert_eq!(out.get_pixel(60, 20).0, [100, 100, 100, 255]);
        assert_ne!(out.get_pixel(5, 35).0, [100, 100, 100, 255]);
    }

    #[test]
    fn png_bytes_decode() {
        let img = gray(7, 3);
        let bytes = encode_png(&img).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }
}
