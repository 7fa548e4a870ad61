// src/services/generation.rs
use crate::errors::SoulCaptionError;
use crate::models::{GeneratedContent, GenerationParams};
use crate::services::prompt;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Instant;

/// External system that turns form parameters into a post.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, params: &GenerationParams)
    -> Result<GeneratedContent, SoulCaptionError>;
}

#[derive(Debug, Deserialize)]
struct CaptionReply {
    #[serde(default)]
    caption: String,
    #[serde(default)]
    hashtags: Vec<String>,
}

/// Client for an OpenAI-compatible API: chat completions for the caption,
/// image generations for the picture.
pub struct OpenAIGenerator {
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
    client: Client,
}

impl OpenAIGenerator {
    pub fn new(
        api_key: String,
        base_url: String,
        text_model: String,
        image_model: String,
    ) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            text_model,
            image_model,
            client: Client::new(),
        }
    }

    async fn generate_caption(
        &self,
        params: &GenerationParams,
    ) -> Result<CaptionReply, SoulCaptionError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.text_model,
                "messages": [
                    { "role": "system", "content": prompt::SYSTEM_PROMPT },
                    { "role": "user", "content": prompt::caption_prompt(params) }
                ],
                "temperature": 0.9,
                "response_format": { "type": "json_object" }
            }))
            .send()
            .await
            .map_err(|e| SoulCaptionError::Generation(format!("caption request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SoulCaptionError::Generation(format!(
                "caption service returned {}: {}",
                status, error_text
            )));
        }

        let result: serde_json::Value = response.json().await.map_err(|e| {
            SoulCaptionError::Generation(format!("failed to parse caption response: {}", e))
        })?;

        let content = result["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| SoulCaptionError::Generation("no content in caption response".into()))?;

        let reply: CaptionReply = serde_json::from_str(content).map_err(|e| {
            SoulCaptionError::Generation(format!("caption reply is not valid JSON: {}", e))
        })?;

        if reply.caption.trim().is_empty() {
            return Err(SoulCaptionError::Generation(
                "service returned an empty caption".into(),
            ));
        }

        Ok(reply)
    }

    /// Returns a `data:` URI for the generated picture.
    async fn generate_image(&self, params: &GenerationParams) -> Result<String, SoulCaptionError> {
        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.image_model,
                "prompt": prompt::image_prompt(params),
                "n": 1,
                "size": "1024x1024",
                "response_format": "b64_json"
            }))
            .send()
            .await
            .map_err(|e| SoulCaptionError::Generation(format!("image request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SoulCaptionError::Generation(format!(
                "image service returned {}: {}",
                status, error_text
            )));
        }

        let result: serde_json::Value = response.json().await.map_err(|e| {
            SoulCaptionError::Generation(format!("failed to parse image response: {}", e))
        })?;

        if let Some(b64_json) = result["data"][0]["b64_json"].as_str() {
            return Ok(format!("data:image/png;base64,{}", b64_json));
        }

        result["data"][0]["url"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SoulCaptionError::Generation("no image data in response".into()))
    }
}

#[async_trait]
impl ContentGenerator for OpenAIGenerator {
    async fn generate(
        &self,
        params: &GenerationParams,
    ) -> Result<GeneratedContent, SoulCaptionError> {
        let start = Instant::now();

        let (caption, image) =
            tokio::join!(self.generate_caption(params), self.generate_image(params));

        let reply = caption?;
        let image_url = match image {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("Image generation failed, returning text only: {}", e);
                None
            }
        };

        log::info!(
            "Generated {} post in {}ms (image: {})",
            params.category,
            start.elapsed().as_millis(),
            image_url.is_some()
        );

        Ok(GeneratedContent::new(reply.caption, reply.hashtags, image_url))
    }
}
