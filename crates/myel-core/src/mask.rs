//! Burn cut and draw strokes into the binary mask.
//!
//! Cuts are painted as foreground (255) so they split a bright region in
//! two; draws are painted as background (0) so they close a gap in a
//! dark sheath. Strokes are applied in list order, so a later stroke
//! overwrites an earlier one wherever they overlap.

use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::annotation::Stroke;
use crate::types::Point;

/// Burn every stroke into `mask`, in order.
pub fn burn_strokes(mask: &mut GrayImage, strokes: &[Stroke]) {
    for stroke in strokes {
        burn_polyline(
            mask,
            &stroke.path.points(),
            stroke.thickness,
            Luma([stroke.color.intensity()]),
        );
    }
}

/// Rasterise an open polyline with round joins.
///
/// Widths of one pixel or less are drawn as plain line segments. Wider
/// strokes stamp a filled disc at every pixel step along each segment.
/// A single point is drawn as one disc.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn burn_polyline(mask: &mut GrayImage, points: &[Point], thickness: u32, color: Luma<u8>) {
    let radius = (thickness / 2) as i32;

    if let [only] = points {
        stamp(mask, *only, radius, color);
        return;
    }

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if thickness <= 1 {
            draw_line_segment_mut(
                mask,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                color,
            );
            continue;
        }
        let steps = a.distance(b).ceil().max(1.0);
        #[allow(clippy::cast_sign_loss)]
        let steps = steps as u32;
        for i in 0..=steps {
            let t = f64::from(i) / f64::from(steps);
            let x = f64::from(b.x - a.x).mul_add(t, f64::from(a.x)).round() as i32;
            let y = f64::from(b.y - a.y).mul_add(t, f64::from(a.y)).round() as i32;
            draw_filled_circle_mut(mask, (x, y), radius, color);
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
fn stamp(mask: &mut GrayImage, at: Point, radius: i32, color: Luma<u8>) {
    if radius == 0 {
        if at.x >= 0
            && at.y >= 0
            && (at.x as u32) < mask.width()
            && (at.y as u32) < mask.height()
        {
            mask.put_pixel(at.x as u32, at.y as u32, color);
        }
    } else {
        draw_filled_circle_mut(mask, (at.x, at.y), radius, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{StrokeColor, StrokePath};

    fn stroke(color: StrokeColor, thickness: u32, path: StrokePath) -> Stroke {
        Stroke {
            thickness,
            color,
            path,
        }
    }

    #[test]
    fn cut_paints_foreground() {
        let mut mask = GrayImage::new(20, 20);
        let cut = stroke(
            StrokeColor::Cut,
            1,
            StrokePath::Straight(Point::new(2, 10), Point::new(17, 10)),
        );
        burn_strokes(&mut mask, &[cut]);
        for x in 2..=17 {
            assert_eq!(mask.get_pixel(x, 10).0[0], 255);
        }
        assert_eq!(mask.get_pixel(10, 5).0[0], 0);
    }

    #[test]
    fn draw_paints_background() {
        let mut mask = GrayImage::from_pixel(20, 20, Luma([255]));
        let draw = stroke(
            StrokeColor::Draw,
            1,
            StrokePath::Freehand(vec![Point::new(5, 2), Point::new(5, 17)]),
        );
        burn_strokes(&mut mask, &[draw]);
        assert_eq!(mask.get_pixel(5, 9).0[0], 0);
        assert_eq!(mask.get_pixel(9, 9).0[0], 255);
    }

    #[test]
    fn later_strokes_win() {
        let mut mask = GrayImage::new(20, 20);
        let cut = stroke(
            StrokeColor::Cut,
            1,
            StrokePath::Straight(Point::new(0, 10), Point::new(19, 10)),
        );
        let draw = stroke(
            StrokeColor::Draw,
            1,
            StrokePath::Straight(Point::new(10, 0), Point::new(10, 19)),
        );
        burn_strokes(&mut mask, &[cut, draw]);
        assert_eq!(mask.get_pixel(10, 10).0[0], 0);
        assert_eq!(mask.get_pixel(4, 10).0[0], 255);
    }

    #[test]
    fn thick_strokes_widen() {
        let mut mask = GrayImage::new(30, 30);
        let cut = stroke(
            StrokeColor::Cut,
            6,
            StrokePath::Straight(Point::new(5, 15), Point::new(25, 15)),
        );
        burn_strokes(&mut mask, &[cut]);
        assert_eq!(mask.get_pixel(15, 13).0[0], 255);
        assert_eq!(mask.get_pixel(15, 17).0[0], 255);
        assert_eq!(mask.get_pixel(15, 25).0[0], 0);
    }

    #[test]
    fn single_point_and_offscreen_strokes_are_safe() {
        let mut mask = GrayImage::new(10, 10);
        let dot = stroke(
            StrokeColor::Cut,
            1,
            StrokePath::Freehand(vec![Point::new(3, 3)]),
        );
        let off = stroke(
            StrokeColor::Cut,
            4,
            StrokePath::Freehand(vec![Point::new(-50, -50), Point::new(-40, -45)]),
        );
        burn_strokes(&mut mask, &[dot, off]);
        assert_eq!(mask.get_pixel(3, 3).0[0], 255);
        assert_eq!(mask.pixels().filter(|p| p.0[0] == 255).count(), 1);
    }
}
