// src/lib.rs
use actix_web::web;
use std::sync::Arc;

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod studio;
pub mod watermark;

use crate::config::AppConfig;
use crate::errors::SoulCaptionError;
use crate::services::{
    Clipboard, CommandClipboard, ContentGenerator, ImageLoader, MemoryClipboard, OpenAIGenerator,
};
use crate::studio::Studio;
use crate::watermark::{BadgeFont, WatermarkCompositor};

#[derive(Clone)]
pub struct AppState {
    pub studio: Arc<Studio>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wires the production services described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, SoulCaptionError> {
        let generator: Arc<dyn ContentGenerator> = Arc::new(OpenAIGenerator::new(
            config.openai.api_key.clone(),
            config.openai.base_url.clone(),
            config.openai.text_model.clone(),
            config.openai.image_model.clone(),
        ));

        let font = match &config.watermark_font_path {
            Some(path) => BadgeFont::from_file(path),
            None => BadgeFont::embedded(),
        }
        .map_err(|e| SoulCaptionError::Config(e.to_string()))?;

        let clipboard: Arc<dyn Clipboard> = match config
            .clipboard_command
            .as_deref()
            .and_then(CommandClipboard::from_command_line)
        {
            Some(command) => Arc::new(command),
            None => Arc::new(MemoryClipboard::new()),
        };

        let studio = Studio::new(
            generator,
            Arc::new(ImageLoader::new(config.image_max_bytes)),
            Arc::new(WatermarkCompositor::new(font)),
            clipboard,
        );

        Ok(Self {
            studio: Arc::new(studio),
            max_upload_bytes: config.image_max_bytes,
        })
    }
}

/// Registers the `/api/v1` routes and the health check.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/options", web::get().to(handlers::get_options))
            .route("/params", web::get().to(handlers::get_params))
            .route("/params", web::patch().to(handlers::update_params))
            .route("/generate", web::post().to(handlers::generate))
            .route("/result", web::get().to(handlers::get_result))
            .route("/copy", web::post().to(handlers::copy_caption))
            .route("/image", web::get().to(handlers::get_image))
            .route("/download", web::get().to(handlers::download))
            .route("/watermark", web::post().to(handlers::watermark_upload)),
    )
    .route("/health", web::get().to(handlers::health_check));
}
