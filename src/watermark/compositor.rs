//! Badge compositor.
//!
//! Draws the author handle badge onto a copy of a decoded image and
//! re-encodes the result as PNG. The source image is never modified.

use super::WatermarkError;
use super::badge::{BACKGROUND_OPACITY, BadgeLayout, CORNER_RADIUS, normalize_handle};
use super::canvas::{Paint, RectF, fill_rounded_rect};
use super::text_renderer::BadgeFont;
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use serde::Serialize;
use std::io::Cursor;

/// Text and geometry of a drawn badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub text: String,
    pub layout: BadgeLayout,
}

/// A flattened PNG carrying the author badge.
#[derive(Debug, Clone)]
pub struct WatermarkedImage {
    pub png: Bytes,
    pub width: u32,
    pub height: u32,
    /// `None` when the author was empty and nothing was drawn.
    pub badge: Option<Badge>,
}

impl WatermarkedImage {
    pub fn data_uri(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(&self.png)
        )
    }
}

#[derive(Debug, Clone)]
pub struct WatermarkCompositor {
    font: BadgeFont,
}

impl WatermarkCompositor {
    pub fn new(font: BadgeFont) -> Self {
        Self { font }
    }

    /// Lays out the badge for a canvas without drawing it.
    pub fn layout(&self, width: u32, height: u32, handle: &str) -> BadgeLayout {
        BadgeLayout::compute(width, height, |size| self.font.measure(handle, size))
    }

    /// Draws the badge onto an RGBA canvas in place.
    pub fn draw(&self, canvas: &mut RgbaImage, author: &str) -> Option<Badge> {
        let handle = normalize_handle(author)?;
        let layout = self.layout(canvas.width(), canvas.height(), &handle);

        fill_rounded_rect(
            canvas,
            RectF::new(layout.x, layout.y, layout.rect_width, layout.rect_height),
            CORNER_RADIUS,
            Paint::black(BACKGROUND_OPACITY),
        );
        self.font.draw_middle(
            canvas,
            &handle,
            layout.text_origin_x(),
            layout.text_middle_y(),
            layout.font_size,
            Paint::white(),
        );

        Some(Badge {
            text: handle,
            layout,
        })
    }

    /// Composites the badge onto a copy of `source` and encodes it as PNG.
    pub fn composite(
        &self,
        source: &DynamicImage,
        author: &str,
    ) -> Result<WatermarkedImage, WatermarkError> {
        let (width, height) = source.dimensions();
        let mut canvas = source.to_rgba8();
        let badge = self.draw(&mut canvas, author);

        let mut output = Vec::new();
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
            .map_err(|e| WatermarkError::Encode(e.to_string()))?;

        match &badge {
            Some(b) => log::debug!("Composited badge {} onto {}x{} image", b.text, width, height),
            None => log::debug!("No author handle, re-encoded {}x{} image as-is", width, height),
        }

        Ok(WatermarkedImage {
            png: Bytes::from(output),
            width,
            height,
            badge,
        })
    }
}
