//! Author badge geometry.
//!
//! Every measurement is derived from the canvas width so the badge keeps
//! the same proportions on any image size. Only the font size has a floor.

use serde::Serialize;

/// Padding as a fraction of canvas width.
pub const PADDING_RATIO: f32 = 0.03;
/// Font size as a fraction of canvas width.
pub const FONT_RATIO: f32 = 0.035;
/// Smallest font size in pixels.
pub const MIN_FONT_SIZE: f32 = 24.0;
/// Corner radius of the badge background.
pub const CORNER_RADIUS: f32 = 12.0;
/// Opacity of the black badge background.
pub const BACKGROUND_OPACITY: f32 = 0.3;

/// Canonical form of an author handle, or `None` when no badge should be drawn.
pub fn normalize_handle(author: &str) -> Option<String> {
    let author = author.trim();
    if author.is_empty() {
        None
    } else if author.starts_with('@') {
        Some(author.to_string())
    } else {
        Some(format!("@{}", author))
    }
}

/// Placement of the badge on a canvas of a given size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeLayout {
    pub padding: f32,
    pub font_size: f32,
    pub text_width: f32,
    pub x: f32,
    pub y: f32,
    pub rect_width: f32,
    pub rect_height: f32,
}

impl BadgeLayout {
    /// Font size used for a canvas of `width` pixels.
    pub fn font_size_for(width: u32) -> f32 {
        (width as f32 * FONT_RATIO).max(MIN_FONT_SIZE)
    }

    /// Lays out the badge anchored at the bottom-right corner.
    ///
    /// `measure` returns the advance width of the handle at the given font size.
    pub fn compute(width: u32, height: u32, measure: impl FnOnce(f32) -> f32) -> Self {
        let w = width as f32;
        let h = height as f32;
        let padding = w * PADDING_RATIO;
        let font_size = Self::font_size_for(width);
        let text_width = measure(font_size);

        let rect_width = text_width + padding * 2.0;
        let rect_height = font_size + padding;

        Self {
            padding,
            font_size,
            text_width,
            x: w - rect_width - padding,
            y: h - rect_height - padding,
            rect_width,
            rect_height,
        }
    }

    /// Pen position of the first glyph.
    pub fn text_origin_x(&self) -> f32 {
        self.x + self.padding
    }

    /// Vertical centre of the badge, where the middle of the em box sits.
    pub fn text_middle_y(&self) -> f32 {
        self.y + self.rect_height / 2.0
    }
}
