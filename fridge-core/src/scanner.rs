//! One scan end to end: analyze an image, then record the result.

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::analysis::AnalysisPipeline;
use crate::encoded_image::EncodedImage;
use crate::error::{AnalysisError, Result};
use crate::history::{HistoryStorage, HistoryStore};
use crate::model::HistoryEntry;

/// Owns the pipeline and the history store for the life of the process.
pub struct Scanner<S> {
    pipeline: AnalysisPipeline,
    history: HistoryStore<S>,
}

impl<S: HistoryStorage> Scanner<S> {
    pub fn new(pipeline: AnalysisPipeline, history: HistoryStore<S>) -> Self {
        Self { pipeline, history }
    }

    pub fn pipeline(&self) -> &AnalysisPipeline {
        &self.pipeline
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore<S> {
        &mut self.history
    }

    /// Analyze `image` and append the result to history.
    ///
    /// If `cancel` fires at any point before the append, the result is
    /// dropped and [`AnalysisError::Cancelled`] is returned; history is left
    /// untouched.
    #[instrument(level = "debug", skip_all)]
    pub async fn scan(
        &mut self,
        image: EncodedImage,
        cancel: &CancellationToken,
    ) -> Result<HistoryEntry> {
        let result = self.pipeline.analyze_cancellable(image, cancel).await?;

        if cancel.is_cancelled() {
            info!("Scan cancelled after reply, result dropped");
            return Err(AnalysisError::Cancelled);
        }

        Ok(self.history.append(result))
    }
}
