// src/config.rs
use crate::errors::SoulCaptionError;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEXT_MODEL: &str = "gpt-4o";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
pub const DEFAULT_IMAGE_MAX_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub openai: OpenAIConfig,
    /// Replaces the bundled badge font when set.
    pub watermark_font_path: Option<PathBuf>,
    /// Program and arguments that receive copied text on stdin.
    pub clipboard_command: Option<String>,
    pub image_max_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, SoulCaptionError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SoulCaptionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY")
            .ok_or_else(|| SoulCaptionError::Config("OPENAI_API_KEY must be set".to_string()))?;

        let image_max_bytes = match get("IMAGE_MAX_BYTES") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                SoulCaptionError::Config(format!("IMAGE_MAX_BYTES is not a number: {}", raw))
            })?,
            None => DEFAULT_IMAGE_MAX_BYTES,
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            openai: OpenAIConfig {
                api_key,
                base_url: get("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                text_model: get("OPENAI_TEXT_MODEL")
                    .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
                image_model: get("OPENAI_IMAGE_MODEL")
                    .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            },
            watermark_font_path: get("WATERMARK_FONT_PATH").map(PathBuf::from),
            clipboard_command: get("CLIPBOARD_COMMAND"),
            image_max_bytes,
        })
    }
}
