//! Watermark error types.

use thiserror::Error;

/// Errors that can occur while compositing a badge.
#[derive(Error, Debug)]
pub enum WatermarkError {
    /// The badge font could not be loaded.
    #[error("Failed to load badge font: {0}")]
    Font(String),

    /// The composited image could not be re-encoded.
    #[error("Failed to encode watermarked image: {0}")]
    Encode(String),
}
