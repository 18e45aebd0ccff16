//! Analysis pipeline: one image in, one parsed [`ScanResult`] out.
//!
//! The pipeline builds a [`ScanRequest`] around the fixed
//! [`INSTRUCTION_TEMPLATE`], hands it to an [`InferenceBackend`], and runs the
//! reply through [`crate::parser`].
//!
//! - **OpenAI** - chat completions with image input (production)
//! - **Mock** - canned reply (testing and offline demos)
//!
//! No retries: a failed call surfaces once, with its cause, as an
//! [`AnalysisError`].
//!
//! ## Example
//!
//! ```no_run
//! use fridge_core::analysis::{AnalysisPipeline, BackendConfig, BackendFactory, PipelineConfig};
//! use fridge_core::EncodedImage;
//!
//! # async fn example() -> fridge_core::Result<()> {
//! let backend = BackendFactory::create(BackendConfig::Auto)?;
//! let pipeline = AnalysisPipeline::new(backend, PipelineConfig::from_env());
//!
//! let image = EncodedImage::from_bytes(&std::fs::read("fridge.jpg").unwrap())?;
//! let result = pipeline.analyze(image).await?;
//! println!("Found {} ingredients", result.found_ingredients.len());
//! # Ok(())
//! # }
//! ```

mod mock;
mod openai;
mod provider;

pub use mock::{MockBackend, SAMPLE_RESPONSE};
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use provider::{BackendConfig, BackendFactory};

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::encoded_image::EncodedImage;
use crate::error::{AnalysisError, Result};
use crate::model::ScanResult;
use crate::parser::{parse_detailed, INSTRUCTION_TEMPLATE};

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default output cap. Bounds cost and the size of the reply to parse.
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Default bound on one inference call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A remote model that turns a [`ScanRequest`] into free text.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Issue exactly one request and return the reply text.
    async fn complete(&self, request: &ScanRequest) -> Result<String>;

    /// Identifies the backend in logs and output.
    fn backend_id(&self) -> BackendKind;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    OpenAi,
    /// Canned replies (NOT a real analysis)
    Mock,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi => write!(f, "OpenAI"),
            Self::Mock => write!(f, "Mock"),
        }
    }
}

/// Everything sent for one scan. Built once, dropped when the call returns.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    image: EncodedImage,
    instruction: &'static str,
    max_tokens: u32,
    model: String,
}

impl ScanRequest {
    pub fn new(image: EncodedImage, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            image,
            instruction: INSTRUCTION_TEMPLATE,
            max_tokens,
            model: model.into(),
        }
    }

    pub fn image(&self) -> &EncodedImage {
        &self.image
    }

    pub fn instruction(&self) -> &str {
        self.instruction
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Request shaping and time bound for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PipelineConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// Optional: `FRIDGE_MODEL`, `FRIDGE_MAX_TOKENS`, `FRIDGE_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        let model = std::env::var("FRIDGE_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let max_tokens = std::env::var("FRIDGE_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let timeout = std::env::var("FRIDGE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self {
            model,
            max_tokens,
            timeout,
        }
    }
}

/// Sends images to an inference backend and parses the replies.
pub struct AnalysisPipeline {
    backend: Arc<dyn InferenceBackend>,
    config: PipelineConfig,
}

impl AnalysisPipeline {
    pub fn new(backend: Arc<dyn InferenceBackend>, config: PipelineConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend_id(&self) -> BackendKind {
        self.backend.backend_id()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Analyze one image.
    ///
    /// Fails only when the call itself fails or returns no text. A reply the
    /// grammar cannot make sense of yields an empty or partial result.
    #[instrument(
        level = "info",
        skip_all,
        fields(backend = %self.backend.backend_id(), model = %self.config.model)
    )]
    pub async fn analyze(&self, image: EncodedImage) -> Result<ScanResult> {
        let request = ScanRequest::new(image, &self.config.model, self.config.max_tokens);
        let start = Instant::now();

        debug!(image = ?request.image(), "Sending scan request");

        let raw = match tokio::time::timeout(self.config.timeout, self.backend.complete(&request))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    timeout_secs = self.config.timeout.as_secs(),
                    "Inference call timed out"
                );
                return Err(AnalysisError::Timeout(self.config.timeout.as_secs()));
            }
        };

        if raw.trim().is_empty() {
            warn!("Inference backend returned empty text");
            return Err(AnalysisError::EmptyResponse);
        }

        debug!(chars = raw.len(), "Received model reply");

        let parsed = parse_detailed(&raw);
        for degradation in &parsed.degradations {
            warn!(reason = %degradation.description(), "Model reply degraded");
        }

        info!(
            latency_ms = start.elapsed().as_millis() as u64,
            ingredients = parsed.result.found_ingredients.len(),
            recipes = parsed.result.recipes.len(),
            "Analysis complete"
        );

        Ok(parsed.result)
    }

    /// Like [`analyze`](Self::analyze), but gives up with
    /// [`AnalysisError::Cancelled`] as soon as `cancel` fires.
    pub async fn analyze_cancellable(
        &self,
        image: EncodedImage,
        cancel: &CancellationToken,
    ) -> Result<ScanResult> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Analysis cancelled before reply");
                Err(AnalysisError::Cancelled)
            }
            result = self.analyze(image) => result,
        }
    }
}
