//! Copy and download actions on a rendered result.

use crate::models::GeneratedContent;
use bytes::Bytes;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

/// How long a successful copy is acknowledged before reverting to idle.
pub const COPY_ACK: Duration = Duration::from_secs(2);

/// Prefix of every downloaded file name.
pub const DOWNLOAD_PREFIX: &str = "soulcaption";

/// Used in file names when no author is set.
pub const FALLBACK_AUTHOR: &str = "blog";

/// Text placed on the clipboard: caption, a blank line, then the hashtags.
pub fn clipboard_payload(content: &GeneratedContent) -> String {
    format!("{}\n\n{}", content.caption, content.hashtags.join(" "))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CopyStatus {
    Idle,
    Copied,
    Failed { message: String },
}

/// Remembers the last copy attempt.
///
/// A success reads as `Copied` for [`COPY_ACK`], then `Idle`. A failure stays
/// visible until the next attempt.
#[derive(Debug, Default)]
pub struct CopyFeedback {
    last: Option<(Instant, Result<(), String>)>,
}

impl CopyFeedback {
    pub fn record_success(&mut self, at: Instant) {
        self.last = Some((at, Ok(())));
    }

    pub fn record_failure(&mut self, at: Instant, message: String) {
        self.last = Some((at, Err(message)));
    }

    pub fn status(&self, now: Instant) -> CopyStatus {
        match &self.last {
            None => CopyStatus::Idle,
            Some((at, Ok(()))) => {
                if now.saturating_duration_since(*at) < COPY_ACK {
                    CopyStatus::Copied
                } else {
                    CopyStatus::Idle
                }
            }
            Some((_, Err(message))) => CopyStatus::Failed {
                message: message.clone(),
            },
        }
    }
}

/// File name for a download taken at `timestamp_ms`.
pub fn download_filename(author: &str, timestamp_ms: i64, extension: &str) -> String {
    let author = author.trim();
    let label: String = if author.is_empty() {
        FALLBACK_AUTHOR.to_string()
    } else {
        author
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect()
    };
    format!("{}_{}_{}.{}", DOWNLOAD_PREFIX, label, timestamp_ms, extension)
}

/// Issues strictly increasing millisecond timestamps so that repeated
/// downloads never reuse a name.
#[derive(Debug, Default)]
pub struct DownloadNamer {
    last_ms: AtomicI64,
}

impl DownloadNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_timestamp(&self, now_ms: i64) -> i64 {
        let mut issued = now_ms;
        // fetch_update only fails if the closure returns None
        let _ = self
            .last_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                issued = now_ms.max(last + 1);
                Some(issued)
            });
        issued
    }

    pub fn filename(&self, author: &str, extension: &str) -> String {
        let ts = self.next_timestamp(chrono::Utc::now().timestamp_millis());
        download_filename(author, ts, extension)
    }
}

/// Bytes ready to be saved by the client.
#[derive(Debug, Clone)]
pub struct DownloadArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

/// Content type and file extension for raw image bytes.
pub fn sniff_image_type(data: &[u8]) -> (&'static str, &'static str) {
    match image::guess_format(data) {
        Ok(image::ImageFormat::Jpeg) => ("image/jpeg", "jpg"),
        Ok(image::ImageFormat::WebP) => ("image/webp", "webp"),
        Ok(image::ImageFormat::Gif) => ("image/gif", "gif"),
        _ => ("image/png", "png"),
    }
}
