//! Minimal 2D drawing primitives over an RGBA buffer.

use image::{Rgba, RgbaImage};

/// Straight-alpha colour with a fractional opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f32,
}

impl Paint {
    pub const fn new(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self { r, g, b, alpha }
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 1.0)
    }

    pub const fn black(alpha: f32) -> Self {
        Self::new(0, 0, 0, alpha)
    }
}

/// Composites `paint` over the pixel at (x, y) with the given coverage.
///
/// Coordinates outside the image are ignored.
pub fn blend_pixel(target: &mut RgbaImage, x: i64, y: i64, paint: Paint, coverage: f32) {
    if x < 0 || y < 0 || x >= target.width() as i64 || y >= target.height() as i64 {
        return;
    }

    let src_a = (paint.alpha * coverage).clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return;
    }

    let pixel = target.get_pixel_mut(x as u32, y as u32);
    *pixel = over(*pixel, paint, src_a);
}

/// Porter-Duff "over" with straight alpha on both sides.
fn over(dst: Rgba<u8>, paint: Paint, src_a: f32) -> Rgba<u8> {
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= f32::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |src: u8, dst: u8| -> u8 {
        let s = src as f32 / 255.0;
        let d = dst as f32 / 255.0;
        let v = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(paint.r, dst[0]),
        channel(paint.g, dst[1]),
        channel(paint.b, dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Axis-aligned rectangle in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// Fills a rounded rectangle with one pixel of anti-aliasing on the edge.
///
/// The radius is clamped to half of the shorter side, as canvas `roundRect` does.
pub fn fill_rounded_rect(target: &mut RgbaImage, rect: RectF, radius: f32, paint: Paint) {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return;
    }

    let radius = radius.clamp(0.0, rect.width.min(rect.height) / 2.0);
    let half_w = rect.width / 2.0;
    let half_h = rect.height / 2.0;
    let cx = rect.x + half_w;
    let cy = rect.y + half_h;

    let x0 = rect.x.floor().max(0.0) as i64;
    let y0 = rect.y.floor().max(0.0) as i64;
    let x1 = ((rect.x + rect.width).ceil() as i64).min(target.width() as i64);
    let y1 = ((rect.y + rect.height).ceil() as i64).min(target.height() as i64);

    for py in y0..y1 {
        for px in x0..x1 {
            let sx = px as f32 + 0.5 - cx;
            let sy = py as f32 + 0.5 - cy;
            let d = rounded_box_distance(sx, sy, half_w, half_h, radius);
            let coverage = (0.5 - d).clamp(0.0, 1.0);
            if coverage > 0.0 {
                blend_pixel(target, px, py, paint, coverage);
            }
        }
    }
}

/// Signed distance from a point (relative to the box centre) to a rounded box.
fn rounded_box_distance(px: f32, py: f32, half_w: f32, half_h: f32, radius: f32) -> f32 {
    let qx = px.abs() - half_w + radius;
    let qy = py.abs() - half_h + radius;
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    let inside = qx.max(qy).min(0.0);
    outside + inside - radius
}
