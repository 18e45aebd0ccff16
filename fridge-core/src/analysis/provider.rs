//! Backend selection.

use std::sync::Arc;

use super::{InferenceBackend, MockBackend, OpenAiBackend, OpenAiConfig};
use crate::error::Result;

/// Configuration for creating inference backends.
#[derive(Debug, Clone, Default)]
pub enum BackendConfig {
    /// OpenAI chat completions
    OpenAi(OpenAiConfig),

    /// Canned reply (testing only); `None` uses the sample reply
    Mock { response: Option<String> },

    /// OpenAI when `OPENAI_API_KEY` is set
    #[default]
    Auto,
}

/// Factory for inference backends.
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend from configuration.
    pub fn create(config: BackendConfig) -> Result<Arc<dyn InferenceBackend>> {
        match config {
            BackendConfig::OpenAi(openai_config) => {
                let backend = OpenAiBackend::new(openai_config)?;
                Ok(Arc::new(backend))
            }
            BackendConfig::Mock { response } => {
                let backend = response.map(MockBackend::new).unwrap_or_default();
                Ok(Arc::new(backend))
            }
            BackendConfig::Auto => Self::create_auto(),
        }
    }

    /// Select OpenAI when configured. Never falls back to the mock.
    fn create_auto() -> Result<Arc<dyn InferenceBackend>> {
        let config = OpenAiConfig::from_env()?;
        tracing::info!("Auto-selected OpenAI backend");
        Self::create(BackendConfig::OpenAi(config))
    }

    /// Create a mock backend for testing.
    pub fn create_mock() -> Arc<dyn InferenceBackend> {
        Arc::new(MockBackend::default())
    }
}
