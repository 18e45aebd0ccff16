//! Mock inference backend for testing.

use std::time::Duration;

use async_trait::async_trait;

use super::{BackendKind, InferenceBackend, ScanRequest};
use crate::error::Result;

/// Reply returned by [`MockBackend::default`].
pub const SAMPLE_RESPONSE: &str = "FOUND_INGREDIENTS:
- eggs
- milk
RECIPES_START
RECIPE_1
NAME: Omelette
TIME: 10 minutes
INGREDIENTS:
- eggs
- milk
INSTRUCTIONS:
- Beat eggs
- Cook on pan
RECIPE_END
RECIPES_END
";

/// Mock backend that answers every request with the same text.
/// WARNING: Does not look at the image!
#[derive(Debug, Clone)]
pub struct MockBackend {
    response: String,
    delay: Option<Duration>,
}

impl MockBackend {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            delay: None,
        }
    }

    /// Wait `delay` before answering, to exercise timeouts and cancellation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(SAMPLE_RESPONSE)
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn complete(&self, _request: &ScanRequest) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.response.clone())
    }

    fn backend_id(&self) -> BackendKind {
        BackendKind::Mock
    }
}
