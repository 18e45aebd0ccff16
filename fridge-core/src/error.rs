use thiserror::Error;

/// Failures of a single analysis call.
///
/// Malformed model text is never an error; see [`crate::parser`].
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Image payload is empty")]
    EmptyImage,

    #[error("Invalid image payload: {0}")]
    InvalidImage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[cfg(feature = "network")]
    #[error("Inference request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Inference endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Inference endpoint returned no text content")]
    EmptyResponse,

    #[error("Inference request timed out after {0}s")]
    Timeout(u64),

    #[error("Analysis cancelled")]
    Cancelled,
}

/// Failures at the history persistence boundary.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
