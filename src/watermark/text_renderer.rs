//! Text measurement and rasterization for the badge label.
//!
//! Sizes are em sizes in pixels, matching CSS `font-size`. The face defaults
//! to the bundled Fira Sans Medium and can be replaced by any TTF/OTF file.

use super::WatermarkError;
use super::canvas::{Paint, blend_pixel};
use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use image::RgbaImage;
use std::path::Path;

const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/FiraSans-Medium.ttf");

/// A loaded font face used to draw badge text.
#[derive(Clone)]
pub struct BadgeFont {
    font: FontArc,
}

impl std::fmt::Debug for BadgeFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BadgeFont")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl BadgeFont {
    /// The bundled sans-serif face, medium weight.
    pub fn embedded() -> Result<Self, WatermarkError> {
        let font = FontArc::try_from_slice(EMBEDDED_FONT_DATA)
            .map_err(|e| WatermarkError::Font(format!("embedded font: {}", e)))?;
        Ok(Self { font })
    }

    pub fn from_file(path: &Path) -> Result<Self, WatermarkError> {
        let data = std::fs::read(path)
            .map_err(|e| WatermarkError::Font(format!("{}: {}", path.display(), e)))?;
        let font = FontArc::try_from_vec(data)
            .map_err(|e| WatermarkError::Font(format!("{}: {}", path.display(), e)))?;
        Ok(Self { font })
    }

    /// ab_glyph scales by line height; convert from an em size.
    fn scale(&self, em_px: f32) -> PxScale {
        let units_per_em = self.font.units_per_em().unwrap_or(2048.0);
        PxScale::from(em_px * self.font.height_unscaled() / units_per_em)
    }

    /// Advance width of `text` in pixels, including kerning.
    pub fn measure(&self, text: &str, em_px: f32) -> f32 {
        let scaled = self.font.as_scaled(self.scale(em_px));
        let mut width = 0.0f32;
        let mut prev: Option<GlyphId> = None;

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }

        width
    }

    /// Draws `text` with its em-box middle at `middle_y` and pen start at `x`.
    pub fn draw_middle(
        &self,
        target: &mut RgbaImage,
        text: &str,
        x: f32,
        middle_y: f32,
        em_px: f32,
        paint: Paint,
    ) {
        let scale = self.scale(em_px);
        let scaled = self.font.as_scaled(scale);
        // descent is negative
        let baseline = middle_y + (scaled.ascent() + scaled.descent()) / 2.0;

        let mut cursor = x;
        let mut prev: Option<GlyphId> = None;

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                cursor += scaled.kern(prev, id);
            }

            let glyph = id.with_scale_and_position(scale, point(cursor, baseline));
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let px = bounds.min.x as i64 + gx as i64;
                    let py = bounds.min.y as i64 + gy as i64;
                    blend_pixel(target, px, py, paint, coverage);
                });
            }

            cursor += scaled.h_advance(id);
            prev = Some(id);
        }
    }
}
