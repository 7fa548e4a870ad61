//! The single-user studio: form state, generation, rendering and actions.
//!
//! State sits behind one async mutex that is never held across a network
//! call. Watermark jobs run on spawned tasks and report back over a channel;
//! a pump task applies their outcomes to the renderer.

pub mod actions;
pub mod renderer;
pub mod workflow;

use crate::errors::SoulCaptionError;
use crate::models::{GenerationParams, GenerationParamsPatch};
use crate::services::image_loader::decode_image;
use crate::services::{Clipboard, ContentGenerator, ImageLoader};
use crate::watermark::{WatermarkCompositor, WatermarkedImage};
use actions::{
    CopyFeedback, CopyStatus, DownloadArtifact, DownloadNamer, clipboard_payload,
    sniff_image_type,
};
use bytes::Bytes;
use renderer::{ImageDisplay, ResultRenderer, WatermarkJob, WatermarkOutcome, WatermarkPhase};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, mpsc, watch};
use workflow::{GenerationState, GenerationWorkflow, Ticket};

/// Snapshot of everything a client needs to draw the result panel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub generation: GenerationState,
    pub caption: Option<String>,
    pub hashtags: Vec<String>,
    pub image: Option<ImageDisplay>,
    pub watermark: WatermarkPhase,
    pub download_enabled: bool,
    pub copy: CopyStatus,
}

struct StudioState {
    params: GenerationParams,
    workflow: GenerationWorkflow,
    renderer: ResultRenderer,
    copy: CopyFeedback,
}

impl StudioState {
    fn view(&self) -> ResultView {
        let content = self.renderer.content();
        ResultView {
            generation: self.workflow.state().clone(),
            caption: content.map(|c| c.caption.clone()),
            hashtags: content.map(|c| c.hashtags.clone()).unwrap_or_default(),
            image: self.renderer.image_display(),
            watermark: self.renderer.phase(),
            download_enabled: self.renderer.download_enabled(),
            copy: self.copy.status(Instant::now()),
        }
    }
}

/// What the image slot resolves to right now.
enum ImageSource {
    Watermarked(Bytes),
    Reference(String),
}

pub struct Studio {
    generator: Arc<dyn ContentGenerator>,
    loader: Arc<ImageLoader>,
    compositor: Arc<WatermarkCompositor>,
    clipboard: Arc<dyn Clipboard>,
    state: Arc<Mutex<StudioState>>,
    outcomes: mpsc::UnboundedSender<WatermarkOutcome>,
    revision: watch::Receiver<u64>,
    namer: DownloadNamer,
}

impl Studio {
    /// Must be called from within a tokio runtime.
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        loader: Arc<ImageLoader>,
        compositor: Arc<WatermarkCompositor>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        let params = GenerationParams::default();
        let state = Arc::new(Mutex::new(StudioState {
            renderer: ResultRenderer::new(&params.author),
            params,
            workflow: GenerationWorkflow::default(),
            copy: CopyFeedback::default(),
        }));

        let (outcomes, rx) = mpsc::unbounded_channel();
        let (revision_tx, revision) = watch::channel(0u64);
        tokio::spawn(apply_outcomes(state.clone(), rx, revision_tx));

        Self {
            generator,
            loader,
            compositor,
            clipboard,
            state,
            outcomes,
            revision,
            namer: DownloadNamer::new(),
        }
    }

    /// Ticks every time a watermark outcome is applied.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.clone()
    }

    pub async fn params(&self) -> GenerationParams {
        self.state.lock().await.params.clone()
    }

    pub async fn update_params(&self, patch: GenerationParamsPatch) -> GenerationParams {
        let mut state = self.state.lock().await;
        if state.params.apply(patch) {
            let author = state.params.author.clone();
            if let Some(job) = state.renderer.set_author(&author) {
                self.spawn_watermark(job);
            }
        }
        state.params.clone()
    }

    pub async fn view(&self) -> ResultView {
        self.state.lock().await.view()
    }

    /// Submits a parameter snapshot to the generation service.
    ///
    /// If the returned future is dropped before the service answers, the
    /// submission is recorded as failed and the next one is accepted.
    pub async fn generate(&self, params: GenerationParams) -> Result<ResultView, SoulCaptionError> {
        let pending = {
            let mut state = self.state.lock().await;
            let ticket = state.workflow.begin()?;
            state.params = params.clone();
            PendingGeneration::new(self.state.clone(), ticket)
        };

        log::info!(
            "Generating post: category={}, length={}, style={}",
            params.category,
            params.length,
            params.style
        );

        let result = self.generator.generate(&params).await.and_then(|content| {
            if content.caption.trim().is_empty() {
                Err(SoulCaptionError::Generation("service returned no caption".into()))
            } else {
                Ok(content)
            }
        });

        let mut state = self.state.lock().await;
        match result {
            Ok(content) => {
                pending.settle(&mut state.workflow, Ok(()));
                let author = state.params.author.clone();
                if let Some(job) = state.renderer.set_content(content, &author) {
                    self.spawn_watermark(job);
                }
                Ok(state.view())
            }
            Err(e) => {
                log::error!("Generation failed: {}", e);
                pending.settle(&mut state.workflow, Err(e.to_string()));
                Err(e)
            }
        }
    }

    fn spawn_watermark(&self, job: WatermarkJob) {
        let loader = self.loader.clone();
        let compositor = self.compositor.clone();
        let outcomes = self.outcomes.clone();

        tokio::spawn(async move {
            let WatermarkJob {
                request_id,
                image_ref,
                author,
            } = job;

            let result = match loader.load(&image_ref).await {
                Ok(source) => {
                    tokio::task::spawn_blocking(move || compositor.composite(&source, &author))
                        .await
                        .map_err(|e| format!("compositing task failed: {}", e))
                        .and_then(|r| r.map_err(|e| e.to_string()))
                }
                Err(e) => Err(e.to_string()),
            };

            // Receiver only goes away when the studio is dropped.
            let _ = outcomes.send(WatermarkOutcome { request_id, result });
        });
    }

    /// Copies caption and hashtags to the clipboard.
    pub async fn copy_caption(&self) -> Result<String, SoulCaptionError> {
        let payload = {
            let state = self.state.lock().await;
            let content = state
                .renderer
                .content()
                .ok_or(SoulCaptionError::NoContent("copy"))?;
            clipboard_payload(content)
        };

        let result = self.clipboard.write_text(&payload).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(()) => {
                log::info!("Copied caption via {} clipboard", self.clipboard.name());
                state.copy.record_success(Instant::now());
                Ok(payload)
            }
            Err(e) => {
                log::warn!("Clipboard write failed: {}", e);
                state.copy.record_failure(Instant::now(), e.to_string());
                Err(e.into())
            }
        }
    }

    async fn current_image(&self) -> Option<(ImageSource, String)> {
        let state = self.state.lock().await;
        let author = state.renderer.author().to_string();
        if let Some(image) = state.renderer.watermarked() {
            return Some((ImageSource::Watermarked(image.png.clone()), author));
        }
        state
            .renderer
            .content()
            .and_then(|c| c.image_url.clone())
            .map(|url| (ImageSource::Reference(url), author))
    }

    /// Bytes, content type and file extension for an image source.
    async fn resolve(
        &self,
        source: ImageSource,
    ) -> Result<(Bytes, &'static str, &'static str), SoulCaptionError> {
        match source {
            ImageSource::Watermarked(png) => Ok((png, "image/png", "png")),
            ImageSource::Reference(url) => {
                let data = self.loader.fetch(&url).await?;
                let (content_type, extension) = sniff_image_type(&data);
                Ok((Bytes::from(data), content_type, extension))
            }
        }
    }

    /// Bytes currently shown in the image slot.
    pub async fn display_image(&self) -> Result<(Bytes, &'static str), SoulCaptionError> {
        let (source, _) = self
            .current_image()
            .await
            .ok_or(SoulCaptionError::NoContent("display"))?;
        let (bytes, content_type, _) = self.resolve(source).await?;
        Ok((bytes, content_type))
    }

    /// The watermarked image if ready, otherwise the raw generated one.
    pub async fn download(&self) -> Result<DownloadArtifact, SoulCaptionError> {
        let (source, author) = self
            .current_image()
            .await
            .ok_or(SoulCaptionError::NoContent("download"))?;
        let (bytes, content_type, extension) = self.resolve(source).await?;

        let filename = self.namer.filename(&author, extension);
        log::info!("Prepared download {} ({} bytes)", filename, bytes.len());

        Ok(DownloadArtifact {
            filename,
            content_type,
            bytes,
        })
    }

    /// Watermarks an uploaded image outside the current result.
    ///
    /// Uploads go through the same size checks as generated images.
    pub async fn watermark_upload(
        &self,
        data: Vec<u8>,
        author: String,
    ) -> Result<WatermarkedImage, SoulCaptionError> {
        let compositor = self.compositor.clone();
        tokio::task::spawn_blocking(move || {
            let source = decode_image(&data)?;
            compositor
                .composite(&source, &author)
                .map_err(|e| SoulCaptionError::ImageProcessing(e.to_string()))
        })
        .await
        .map_err(|e| SoulCaptionError::ImageProcessing(format!("compositing task failed: {}", e)))?
    }
}

/// Message recorded when a submission is dropped before it completes.
pub const ABANDONED_MESSAGE: &str = "generation request was abandoned before completion";

/// Holds the ticket of an in-flight generation until it is settled.
///
/// Dropping it unsettled (client disconnect, cancellation, panic) marks the
/// submission failed so the workflow never stays `Loading`.
struct PendingGeneration {
    state: Arc<Mutex<StudioState>>,
    ticket: Option<Ticket>,
}

impl PendingGeneration {
    fn new(state: Arc<Mutex<StudioState>>, ticket: Ticket) -> Self {
        Self {
            state,
            ticket: Some(ticket),
        }
    }

    fn settle(mut self, workflow: &mut GenerationWorkflow, outcome: Result<(), String>) {
        if let Some(ticket) = self.ticket.take() {
            match outcome {
                Ok(()) => workflow.succeed(ticket),
                Err(message) => workflow.fail(ticket, message),
            }
        }
    }
}

impl Drop for PendingGeneration {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };
        log::warn!("Generation {} abandoned before completion", ticket.id());

        match self.state.try_lock() {
            Ok(mut state) => state.workflow.fail(ticket, ABANDONED_MESSAGE.to_string()),
            Err(_) => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let state = self.state.clone();
                    handle.spawn(async move {
                        state
                            .lock()
                            .await
                            .workflow
                            .fail(ticket, ABANDONED_MESSAGE.to_string());
                    });
                }
                Err(_) => log::error!("No runtime to release abandoned generation"),
            },
        }
    }
}

async fn apply_outcomes(
    state: Arc<Mutex<StudioState>>,
    mut rx: mpsc::UnboundedReceiver<WatermarkOutcome>,
    revision: watch::Sender<u64>,
) {
    while let Some(outcome) = rx.recv().await {
        let applied = state.lock().await.renderer.complete(outcome);
        if applied {
            revision.send_modify(|r| *r += 1);
        }
    }
}
