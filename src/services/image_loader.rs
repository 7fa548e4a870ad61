// src/services/image_loader.rs
use base64::{Engine as _, engine::general_purpose};
use image::DynamicImage;
use image::io::Reader;
use reqwest::Client;
use std::io::Cursor;
use thiserror::Error;

/// Largest accepted side of a decoded image.
pub const MAX_DIMENSION: u32 = 8192;

#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("Unsupported image reference: {0}")]
    UnsupportedReference(String),

    #[error("Malformed data URI: {0}")]
    MalformedDataUri(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Image is larger than {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Decode failed: {0}")]
    Decode(String),
}

/// Where an image reference points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// `data:<mime>;base64,<payload>`
    DataUri { mime: String, payload: String },
    /// `http://` or `https://` URL
    Remote(String),
}

impl ImageReference {
    pub fn parse(reference: &str) -> Result<Self, ImageLoadError> {
        let reference = reference.trim();
        if let Some(rest) = reference.strip_prefix("data:") {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| ImageLoadError::MalformedDataUri("missing ','".to_string()))?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or_else(|| ImageLoadError::MalformedDataUri("only base64 payloads".to_string()))?;
            Ok(ImageReference::DataUri {
                mime: mime.to_string(),
                payload: payload.to_string(),
            })
        } else if reference.starts_with("http://") || reference.starts_with("https://") {
            Ok(ImageReference::Remote(reference.to_string()))
        } else {
            Err(ImageLoadError::UnsupportedReference(
                reference.chars().take(64).collect(),
            ))
        }
    }
}

/// Resolves image references to bytes and decoded images.
pub struct ImageLoader {
    client: Client,
    max_bytes: usize,
}

impl ImageLoader {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            client: Client::new(),
            max_bytes,
        }
    }

    /// Raw bytes behind a reference, without decoding.
    pub async fn fetch(&self, reference: &str) -> Result<Vec<u8>, ImageLoadError> {
        let data = match ImageReference::parse(reference)? {
            ImageReference::DataUri { payload, .. } => general_purpose::STANDARD
                .decode(payload.as_bytes())
                .map_err(|e| ImageLoadError::MalformedDataUri(e.to_string()))?,
            ImageReference::Remote(url) => self.fetch_remote(&url).await?,
        };

        if data.len() > self.max_bytes {
            return Err(ImageLoadError::TooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(data)
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, ImageLoadError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageLoadError::Fetch(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ImageLoadError::Fetch(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.max_bytes {
                return Err(ImageLoadError::TooLarge {
                    limit: self.max_bytes,
                });
            }
        }

        // Chunked bodies carry no length; enforce the cap while reading.
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ImageLoadError::Fetch(format!("failed to read body: {}", e)))?
        {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(ImageLoadError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    /// Fetches and fully decodes a reference.
    pub async fn load(&self, reference: &str) -> Result<DynamicImage, ImageLoadError> {
        let data = self.fetch(reference).await?;
        tokio::task::spawn_blocking(move || decode_image(&data))
            .await
            .map_err(|e| ImageLoadError::Decode(format!("decode task failed: {}", e)))?
    }
}

/// Decodes image bytes, rejecting anything larger than `MAX_DIMENSION` on a
/// side before the pixel data is allocated.
pub fn decode_image(data: &[u8]) -> Result<DynamicImage, ImageLoadError> {
    let (width, height) = Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageLoadError::Decode(e.to_string()))?
        .into_dimensions()
        .map_err(|e| ImageLoadError::Decode(format!("Invalid image format: {}", e)))?;

    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(ImageLoadError::Decode(format!(
            "Image dimensions {}x{} exceed {2}x{2}",
            width, height, MAX_DIMENSION
        )));
    }

    image::load_from_memory(data)
        .map_err(|e| ImageLoadError::Decode(format!("Invalid image format: {}", e)))
}
