//! OpenAI chat-completions backend with image input.
//!
//! Sends the instruction template and the image as one user message and
//! returns `choices[0].message.content`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{BackendKind, InferenceBackend, ScanRequest, DEFAULT_TIMEOUT};
use crate::error::{AnalysisError, Result};

/// Default chat-completions endpoint.
const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Image detail level sent with every request.
const IMAGE_DETAIL: &str = "low";

/// Longest error body kept in [`AnalysisError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Configuration for the OpenAI backend.
#[derive(Clone)]
pub struct OpenAiConfig {
    /// Chat-completions endpoint URL.
    pub api_url: String,
    /// Bearer token.
    pub api_key: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Refuse plain-HTTP endpoints.
    pub https_only: bool,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("https_only", &self.https_only)
            .finish()
    }
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            https_only: true,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required: `OPENAI_API_KEY`
    /// Optional: `OPENAI_API_URL`, `FRIDGE_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AnalysisError::Config("OPENAI_API_KEY environment variable not set".into())
            })?;

        let api_url =
            std::env::var("OPENAI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout = std::env::var("FRIDGE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(Self {
            api_url,
            api_key,
            timeout,
            https_only: true,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
    detail: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn build_body(request: &ScanRequest) -> ChatRequest<'_> {
    ChatRequest {
        model: request.model(),
        max_tokens: request.max_tokens(),
        messages: vec![ChatMessage {
            role: "user",
            content: vec![
                ContentPart::Text {
                    text: request.instruction(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: request.image().to_data_uri(),
                        detail: IMAGE_DETAIL,
                    },
                },
            ],
        }],
    }
}

/// Text of the first choice; absent or blank content is an error.
fn extract_content(response: ChatResponse) -> Result<String> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(AnalysisError::EmptyResponse)?;

    if choice.finish_reason.as_deref() == Some("length") {
        warn!("Model reply truncated by the output cap");
    }

    choice
        .message
        .and_then(|m| m.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(AnalysisError::EmptyResponse)
}

fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

/// OpenAI chat-completions client.
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Create a backend with an explicit configuration.
    #[instrument(level = "debug", skip_all, fields(api_url = %config.api_url))]
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        debug!("Creating OpenAI client");

        let client = Client::builder()
            .timeout(config.timeout)
            .https_only(config.https_only)
            .build()
            .map_err(|e| {
                warn!(error = %e, "Failed to create HTTP client");
                AnalysisError::Config(format!("Failed to create HTTP client: {e}"))
            })?;

        info!("OpenAI client created");
        Ok(Self { client, config })
    }

    /// Create a backend configured from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiConfig::from_env()?)
    }
}

#[async_trait]
impl InferenceBackend for OpenAiBackend {
    #[instrument(
        level = "info",
        skip_all,
        fields(source = "openai", model = %request.model(), max_tokens = request.max_tokens())
    )]
    async fn complete(&self, request: &ScanRequest) -> Result<String> {
        let start = Instant::now();

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&build_body(request))
            .send()
            .await
            .map_err(|e| {
                let latency_ms = start.elapsed().as_millis() as u64;
                warn!(error = %e, latency_ms, "Inference request failed");
                if e.is_timeout() {
                    AnalysisError::Timeout(self.config.timeout.as_secs())
                } else {
                    AnalysisError::Transport(e)
                }
            })?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = %status,
                latency_ms = start.elapsed().as_millis() as u64,
                "Inference endpoint returned an error"
            );
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to decode chat completion");
            AnalysisError::Transport(e)
        })?;

        let content = extract_content(parsed)?;

        info!(
            latency_ms = start.elapsed().as_millis() as u64,
            chars = content.len(),
            "Received model reply"
        );

        Ok(content)
    }

    fn backend_id(&self) -> BackendKind {
        BackendKind::OpenAi
    }
}
