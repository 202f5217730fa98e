//! Transformation pipeline orchestrator.
//!
//! Composes classification, mode resolution, generation (live or simulated),
//! transparency enforcement, and usage accounting into the two public
//! operations: `remove_text` and `generate_from_prompt`. The orchestrator
//! performs no blanket retry anywhere; retries, if any, belong to the
//! caller's UI layer.

use std::sync::Arc;

use uuid::Uuid;

use stickerlab_core::{
    EnvModeResolver, FallbackTier, MediaAsset, ModeResolver, PipelineConfig, Resolution,
    TransformError, TransformRequest, TransformResult, UsageCounter, UsageMode,
};
use stickerlab_processing::{classify, codec, demo::DemoSimulator, frames, TransparencyEnforcer};
use stickerlab_services::{
    GeminiImageClient, GenerativeBackend, MatteServiceClient, SegmentationBackend,
};

/// Fixed instruction for the text-removal operation. Not user-editable.
const REMOVE_TEXT_INSTRUCTION: &str = "Remove every caption, overlaid text, and watermark from \
    this image, reconstructing the pixels behind them. Keep the subject untouched and place it \
    on a fully transparent background.";

/// Fixed style suffix appended to every generation prompt. Not user-editable.
const GENERATION_STYLE_INSTRUCTION: &str = "Render a single sticker-style subject on a plain, \
    uniform background suitable for background removal.";

pub struct TransformPipeline {
    resolver: Arc<dyn ModeResolver>,
    backend: Arc<dyn GenerativeBackend>,
    enforcer: TransparencyEnforcer,
    usage: Arc<UsageCounter>,
    max_asset_bytes: usize,
}

impl TransformPipeline {
    pub fn new(
        resolver: Arc<dyn ModeResolver>,
        backend: Arc<dyn GenerativeBackend>,
        enforcer: TransparencyEnforcer,
        usage: Arc<UsageCounter>,
        max_asset_bytes: usize,
    ) -> Self {
        Self {
            resolver,
            backend,
            enforcer,
            usage,
            max_asset_bytes,
        }
    }

    /// Wire the production pipeline from configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let resolver = Arc::new(EnvModeResolver::new(config.clone()));
        let backend = Arc::new(GeminiImageClient::new(
            config.gemini_model.clone(),
            config.generative_timeout_secs,
        ));
        let segmentation: Option<Arc<dyn SegmentationBackend>> =
            config.segmentation_endpoint.as_ref().map(|endpoint| {
                Arc::new(MatteServiceClient::new(
                    endpoint.clone(),
                    config.segmentation_api_key.clone(),
                    config.segmentation_timeout_secs,
                )) as Arc<dyn SegmentationBackend>
            });
        Self::new(
            resolver,
            backend,
            TransparencyEnforcer::new(segmentation),
            Arc::new(UsageCounter::new()),
            config.max_asset_bytes,
        )
    }

    /// Scrub caption text and watermarks from an asset.
    ///
    /// Animated input is approximated by its first frame: per-frame
    /// re-synthesis would cost one generative call per frame, so the single
    /// representative frame stands in for the whole animation and the result
    /// is tagged accordingly.
    pub async fn remove_text(&self, asset: MediaAsset) -> Result<TransformResult, TransformError> {
        self.run(TransformRequest::TextRemoval { asset }).await
    }

    /// Generate a fresh image from a prompt at the requested resolution.
    pub async fn generate_from_prompt(
        &self,
        prompt: &str,
        resolution: Resolution,
    ) -> Result<TransformResult, TransformError> {
        self.run(TransformRequest::Generation {
            prompt: prompt.to_string(),
            resolution,
        })
        .await
    }

    /// Successful transformations so far (live and demo both count).
    pub fn usage_total(&self) -> u64 {
        self.usage.total()
    }

    pub fn usage_counter(&self) -> Arc<UsageCounter> {
        Arc::clone(&self.usage)
    }

    async fn run(&self, request: TransformRequest) -> Result<TransformResult, TransformError> {
        request.validate()?;
        let invocation = Uuid::new_v4();
        tracing::info!(%invocation, kind = request.kind(), "starting transformation");

        let result = match request {
            TransformRequest::TextRemoval { asset } => self.run_text_removal(asset).await?,
            TransformRequest::Generation { prompt, resolution } => {
                self.run_generation(&prompt, resolution).await?
            }
        };

        let total = self.usage.record_success();
        tracing::info!(
            %invocation,
            mode = ?result.mode,
            tier = ?result.tier,
            total_transforms = total,
            "transformation complete"
        );
        Ok(result)
    }

    async fn run_text_removal(
        &self,
        asset: MediaAsset,
    ) -> Result<TransformResult, TransformError> {
        if asset.len() > self.max_asset_bytes {
            return Err(TransformError::InvalidRequest(format!(
                "asset is {} bytes, limit is {}",
                asset.len(),
                self.max_asset_bytes
            )));
        }

        let probe = classify(&asset)?;
        let (source, representative_frame) = if probe.is_animated {
            tracing::info!(
                frames = probe.frame_count,
                "animated asset: transforming the representative first frame only"
            );
            (frames::first_frame(asset.bytes())?, true)
        } else {
            (codec::decode_raster(asset.bytes())?, false)
        };

        let mode = self.resolver.resolve();
        if !mode.live {
            let raster = DemoSimulator::remove_text(&source)?;
            return Ok(TransformResult {
                raster,
                mode: UsageMode::Demo,
                tier: FallbackTier::None,
                representative_frame,
            });
        }

        let credential = require_credential(&mode.credential)?;
        // canonicalize before transmission: the backend accepts only a small
        // fixed set of encodings
        let png = codec::encode_png(&source)?;
        let candidate = self
            .backend
            .edit_image(credential, &png, REMOVE_TEXT_INSTRUCTION)
            .await?;
        let raster = codec::decode_raster(&candidate)?;
        let (matted, tier) = self.enforcer.enforce(&raster).await;

        Ok(TransformResult {
            raster: matted,
            mode: UsageMode::Live,
            tier,
            representative_frame,
        })
    }

    async fn run_generation(
        &self,
        prompt: &str,
        resolution: Resolution,
    ) -> Result<TransformResult, TransformError> {
        let mode = self.resolver.resolve();
        if !mode.live {
            let raster = DemoSimulator::generate_placeholder(prompt, resolution);
            return Ok(TransformResult {
                raster,
                mode: UsageMode::Demo,
                tier: FallbackTier::None,
                representative_frame: false,
            });
        }

        let credential = require_credential(&mode.credential)?;
        let full_prompt = format!("{prompt}. {GENERATION_STYLE_INSTRUCTION}");
        let candidate = self
            .backend
            .generate_image(credential, &full_prompt, resolution)
            .await?;
        let raster = codec::decode_raster(&candidate)?;
        let (matted, tier) = self.enforcer.enforce(&raster).await;

        Ok(TransformResult {
            raster: matted,
            mode: UsageMode::Live,
            tier,
            representative_frame: false,
        })
    }
}

fn require_credential(credential: &Option<String>) -> Result<&str, TransformError> {
    credential.as_deref().ok_or_else(|| {
        TransformError::Internal("mode resolved live without a credential".into())
    })
}
