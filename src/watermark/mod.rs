//! Author badge watermarking.
//!
//! A badge is a semi-transparent rounded rectangle in the bottom-right corner
//! with the author handle written in white. Geometry scales with image width:
//!
//! - padding: 3% of width
//! - font size: 3.5% of width, never below 24px
//! - background: black at 30% opacity, corner radius 12

pub mod badge;
pub mod canvas;
pub mod compositor;
pub mod error;
pub mod text_renderer;

pub use badge::{BadgeLayout, normalize_handle};
pub use compositor::{Badge, WatermarkCompositor, WatermarkedImage};
pub use error::WatermarkError;
pub use text_renderer::BadgeFont;
