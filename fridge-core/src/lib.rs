//! FridgeAI Core - turn a photo of a fridge into ingredients and recipes
//!
//! This crate holds everything between the camera and the screen:
//!
//! - [`EncodedImage`] - the still frame handed over by the capture side
//! - [`analysis`] - sends the image to a multimodal model with a fixed
//!   instruction template (requires the `network` feature)
//! - [`parser`] - the reply grammar; turns free text into a [`ScanResult`]
//!   and never fails
//! - [`history`] - persisted list of past scans, newest first
//! - [`Scanner`] - one scan end to end, with cancellation
//!
//! # Example
//!
//! ```no_run
//! use fridge_core::analysis::{AnalysisPipeline, MockBackend, PipelineConfig};
//! use fridge_core::history::{FileStorage, HistoryStore};
//! use fridge_core::{EncodedImage, Scanner};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> fridge_core::Result<()> {
//! let pipeline = AnalysisPipeline::new(Arc::new(MockBackend::default()), PipelineConfig::default());
//! let history = HistoryStore::load(FileStorage::new("/tmp/fridge"));
//! let mut scanner = Scanner::new(pipeline, history);
//!
//! let image = EncodedImage::from_bytes(b"\xFF\xD8\xFF\xE0...")?;
//! let entry = scanner.scan(image, &CancellationToken::new()).await?;
//!
//! for recipe in &entry.recipes {
//!     println!("{} ({})", recipe.title, recipe.cook_time);
//! }
//! # Ok(())
//! # }
//! ```

pub mod encoded_image;
pub mod error;
pub mod history;
pub mod model;
pub mod parser;

#[cfg(feature = "network")]
pub mod analysis;
#[cfg(feature = "network")]
mod scanner;

pub use encoded_image::EncodedImage;
pub use error::{AnalysisError, Result, StorageError};
pub use history::{FileStorage, HistoryStorage, HistoryStore, MemoryStorage, HISTORY_KEY};
pub use model::{HistoryEntry, Recipe, ScanResult};
pub use parser::{parse, parse_detailed, Degradation, ParsedResponse, INSTRUCTION_TEMPLATE};

#[cfg(feature = "network")]
pub use analysis::{
    AnalysisPipeline, BackendConfig, BackendFactory, BackendKind, InferenceBackend, MockBackend,
    OpenAiBackend, OpenAiConfig, PipelineConfig, ScanRequest,
};
#[cfg(feature = "network")]
pub use scanner::Scanner;

#[cfg(all(test, feature = "network"))]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    /// Integration test: scan, persist, reopen, read back.
    #[tokio::test]
    async fn test_full_scan_workflow() {
        let temp = tempfile::TempDir::new().unwrap();

        // Step 1: Scan with the canned reply
        let pipeline =
            AnalysisPipeline::new(Arc::new(MockBackend::default()), PipelineConfig::default());
        let history = HistoryStore::load(FileStorage::new(temp.path()));
        let mut scanner = Scanner::new(pipeline, history);

        let image = EncodedImage::from_bytes(b"\x89PNG\r\n\x1a\nfake").unwrap();
        let entry = scanner
            .scan(image, &CancellationToken::new())
            .await
            .expect("Scan failed");

        // Step 2: Reopen the store from disk
        let reopened = HistoryStore::load(FileStorage::new(temp.path()));
        assert_eq!(reopened.len(), 1);

        // Step 3: The persisted entry matches what the scan returned
        let stored = reopened.get(&entry.id).expect("Entry not persisted");
        assert_eq!(stored, &entry);
        assert_eq!(stored.found_ingredients, vec!["eggs", "milk"]);
        assert_eq!(stored.recipes[0].cook_time, "10 minutes");
    }
}
