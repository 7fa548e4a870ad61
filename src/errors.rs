// src/errors.rs
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::services::clipboard::ClipboardError;
use crate::services::image_loader::ImageLoadError;

#[derive(Error, Debug)]
pub enum SoulCaptionError {
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("A generation request is already in flight")]
    GenerationInProgress,

    #[error("Image load failed: {0}")]
    ImageLoad(#[from] ImageLoadError),

    #[error("Clipboard write failed: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Nothing to {0} yet")]
    NoContent(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ResponseError for SoulCaptionError {
    fn error_response(&self) -> HttpResponse {
        match self {
            SoulCaptionError::Generation(_) => HttpResponse::BadGateway().json(serde_json::json!({
                "error": "AI service error",
                "message": self.to_string()
            })),
            SoulCaptionError::GenerationInProgress => {
                HttpResponse::Conflict().json(serde_json::json!({
                    "error": "Busy",
                    "message": self.to_string()
                }))
            }
            SoulCaptionError::ImageLoad(_) => {
                HttpResponse::UnprocessableEntity().json(serde_json::json!({
                    "error": "Image load error",
                    "message": self.to_string()
                }))
            }
            SoulCaptionError::Clipboard(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Clipboard error",
                    "message": self.to_string()
                }))
            }
            SoulCaptionError::ImageProcessing(_) => {
                HttpResponse::UnprocessableEntity().json(serde_json::json!({
                    "error": "Image processing error",
                    "message": self.to_string()
                }))
            }
            SoulCaptionError::NoContent(_) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "No content",
                "message": self.to_string()
            })),
            SoulCaptionError::Validation(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Validation error",
                "message": self.to_string()
            })),
            SoulCaptionError::Config(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Configuration error",
                    "message": self.to_string()
                }))
            }
        }
    }
}
