#![allow(dead_code)]

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use soulcaption::AppState;
use soulcaption::errors::SoulCaptionError;
use soulcaption::models::{GeneratedContent, GenerationParams};
use soulcaption::services::clipboard::ClipboardError;
use soulcaption::services::{Clipboard, ContentGenerator, ImageLoader, MemoryClipboard};
use soulcaption::studio::renderer::WatermarkPhase;
use soulcaption::studio::{ResultView, Studio};
use soulcaption::watermark::{BadgeFont, WatermarkCompositor};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([90, 140, 200, 255]));
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

pub fn png_data_uri(width: u32, height: u32) -> String {
    format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png_bytes(width, height))
    )
}

pub fn content(caption: &str, hashtags: &[&str], image_url: Option<String>) -> GeneratedContent {
    GeneratedContent::new(
        caption.to_string(),
        hashtags.iter().map(|t| t.to_string()).collect(),
        image_url,
    )
}

/// Replays canned responses in order.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<GeneratedContent, String>>>,
    pub calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<Result<GeneratedContent, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _params: &GenerationParams,
    ) -> Result<GeneratedContent, SoulCaptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(content)) => Ok(content),
            Some(Err(message)) => Err(SoulCaptionError::Generation(message)),
            None => Err(SoulCaptionError::Generation("no scripted response".into())),
        }
    }
}

pub struct FailingClipboard;

#[async_trait]
impl Clipboard for FailingClipboard {
    async fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable("permission denied".into()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

pub fn studio_with(
    generator: Arc<dyn ContentGenerator>,
    clipboard: Arc<dyn Clipboard>,
) -> Studio {
    Studio::new(
        generator,
        Arc::new(ImageLoader::new(8 * 1024 * 1024)),
        Arc::new(WatermarkCompositor::new(BadgeFont::embedded().unwrap())),
        clipboard,
    )
}

pub fn app_state(
    generator: Arc<dyn ContentGenerator>,
    clipboard: Arc<dyn Clipboard>,
) -> AppState {
    AppState {
        studio: Arc::new(studio_with(generator, clipboard)),
        max_upload_bytes: 8 * 1024 * 1024,
    }
}

pub fn memory_app_state(generator: Arc<dyn ContentGenerator>) -> (AppState, Arc<MemoryClipboard>) {
    let clipboard = Arc::new(MemoryClipboard::new());
    (app_state(generator, clipboard.clone()), clipboard)
}

/// Waits until no watermark attempt is in flight.
pub async fn settle(studio: &Studio) -> ResultView {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let view = studio.view().await;
            if view.watermark != WatermarkPhase::Loading {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("watermark did not settle")
}
