//! Result display state.
//!
//! Each watermark attempt moves through `Idle -> Loading -> Loaded | LoadFailed`.
//! Attempts are numbered; an outcome is applied only if it belongs to the
//! latest attempt, so a slow load can never overwrite a newer image/author pair.

use crate::models::GeneratedContent;
use crate::watermark::{Badge, WatermarkedImage, normalize_handle};
use serde::Serialize;

/// Shown instead of the picture when the service returned none.
pub const IMAGE_PLACEHOLDER: &str = "Không thể tạo ảnh. Vui lòng thử lại.";

#[derive(Debug, Clone, Default)]
pub enum WatermarkState {
    #[default]
    Idle,
    Loading { request_id: u64 },
    Loaded { request_id: u64, image: WatermarkedImage },
    LoadFailed { request_id: u64, reason: String },
}

/// Work order for one compositing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkJob {
    pub request_id: u64,
    pub image_ref: String,
    pub author: String,
}

#[derive(Debug)]
pub struct WatermarkOutcome {
    pub request_id: u64,
    pub result: Result<WatermarkedImage, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WatermarkPhase {
    Idle,
    Loading,
    Loaded,
    LoadFailed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ImageDisplay {
    Watermarked { src: String, badge: Option<Badge> },
    Original { src: String },
    Placeholder { message: &'static str },
}

#[derive(Debug, Default)]
pub struct ResultRenderer {
    content: Option<GeneratedContent>,
    author: String,
    latest_request: u64,
    watermark: WatermarkState,
}

impl ResultRenderer {
    pub fn new(author: &str) -> Self {
        Self {
            author: author.to_string(),
            ..Self::default()
        }
    }

    pub fn content(&self) -> Option<&GeneratedContent> {
        self.content.as_ref()
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn watermark_state(&self) -> &WatermarkState {
        &self.watermark
    }

    pub fn watermarked(&self) -> Option<&WatermarkedImage> {
        match &self.watermark {
            WatermarkState::Loaded { image, .. } => Some(image),
            _ => None,
        }
    }

    /// Replaces the displayed content wholesale.
    pub fn set_content(&mut self, content: GeneratedContent, author: &str) -> Option<WatermarkJob> {
        self.content = Some(content);
        self.author = author.to_string();
        self.restart()
    }

    /// Updates the author. Unchanged authors do not restart compositing.
    pub fn set_author(&mut self, author: &str) -> Option<WatermarkJob> {
        if self.author == author {
            return None;
        }
        self.author = author.to_string();
        self.restart()
    }

    /// Discards the current derived image and, if there is an image and an
    /// author, issues a new attempt.
    fn restart(&mut self) -> Option<WatermarkJob> {
        self.latest_request += 1;
        let request_id = self.latest_request;

        let image_ref = self.content.as_ref().and_then(|c| c.image_url.clone());
        match (image_ref, normalize_handle(&self.author)) {
            (Some(image_ref), Some(_)) => {
                self.watermark = WatermarkState::Loading { request_id };
                Some(WatermarkJob {
                    request_id,
                    image_ref,
                    author: self.author.clone(),
                })
            }
            _ => {
                self.watermark = WatermarkState::Idle;
                None
            }
        }
    }

    /// Applies an outcome. Returns false if it belonged to a superseded attempt.
    pub fn complete(&mut self, outcome: WatermarkOutcome) -> bool {
        if outcome.request_id != self.latest_request
            || !matches!(self.watermark, WatermarkState::Loading { .. })
        {
            log::debug!(
                "Dropping stale watermark outcome {} (latest {})",
                outcome.request_id,
                self.latest_request
            );
            return false;
        }

        let request_id = outcome.request_id;
        self.watermark = match outcome.result {
            Ok(image) => WatermarkState::Loaded { request_id, image },
            Err(reason) => {
                log::warn!("Watermark attempt {} failed: {}", request_id, reason);
                WatermarkState::LoadFailed { request_id, reason }
            }
        };
        true
    }

    pub fn phase(&self) -> WatermarkPhase {
        match self.watermark_state() {
            WatermarkState::Idle => WatermarkPhase::Idle,
            WatermarkState::Loading { .. } => WatermarkPhase::Loading,
            WatermarkState::Loaded { .. } => WatermarkPhase::Loaded,
            WatermarkState::LoadFailed { .. } => WatermarkPhase::LoadFailed,
        }
    }

    /// What to show in the image slot. `None` before any content exists.
    pub fn image_display(&self) -> Option<ImageDisplay> {
        let content = self.content.as_ref()?;
        if let Some(image) = self.watermarked() {
            return Some(ImageDisplay::Watermarked {
                src: image.data_uri(),
                badge: image.badge.clone(),
            });
        }
        Some(match &content.image_url {
            Some(src) => ImageDisplay::Original { src: src.clone() },
            None => ImageDisplay::Placeholder {
                message: IMAGE_PLACEHOLDER,
            },
        })
    }

    pub fn download_enabled(&self) -> bool {
        self.watermarked().is_some()
            || self
                .content
                .as_ref()
                .is_some_and(|c| c.image_url.is_some())
    }
}
