//! Exit codes following sysexits.h conventions.
//!
//! Scripts can tell a bad input file apart from an unreachable endpoint
//! or a full disk without parsing stderr.

use fridge_core::{AnalysisError, StorageError};

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Cannot open input file, or it is not an image.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Inference endpoint unreachable, failing, or silent.
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const SERVICE_UNAVAILABLE: i32 = 69;

/// Cannot write history.
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Interrupted by Ctrl-C (128 + SIGINT).
pub const CANCELLED: i32 = 130;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        let code = err
            .chain()
            .find_map(|cause| {
                if let Some(e) = cause.downcast_ref::<AnalysisError>() {
                    Some(code_for_analysis(e))
                } else if cause.is::<StorageError>() {
                    Some(IO_ERROR)
                } else {
                    None
                }
            })
            .unwrap_or_else(|| code_for_message(&message));

        Self {
            code,
            message: Some(message),
        }
    }
}

fn code_for_analysis(err: &AnalysisError) -> i32 {
    match err {
        AnalysisError::EmptyImage | AnalysisError::InvalidImage(_) => INPUT_ERROR,
        AnalysisError::Transport(_)
        | AnalysisError::Status { .. }
        | AnalysisError::EmptyResponse
        | AnalysisError::Timeout(_) => SERVICE_UNAVAILABLE,
        AnalysisError::Cancelled => CANCELLED,
        AnalysisError::Config(_) => GENERAL_ERROR,
    }
}

// Errors raised by the CLI itself carry no typed cause; classify by context.
fn code_for_message(message: &str) -> i32 {
    if message.contains("Failed to read") {
        INPUT_ERROR
    } else if message.contains("Failed to write") {
        IO_ERROR
    } else {
        GENERAL_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_input_errors() {
        let err = anyhow::anyhow!("No such file").context("Failed to read image: a.jpg");
        assert_eq!(ExitCode::from_anyhow(&err).code, INPUT_ERROR);

        let err = anyhow::Error::new(AnalysisError::EmptyImage);
        assert_eq!(ExitCode::from_anyhow(&err).code, INPUT_ERROR);
    }

    #[test]
    fn test_service_errors_through_context() {
        let err: anyhow::Result<()> = Err(AnalysisError::Timeout(60)).context("Scan failed");
        let exit = ExitCode::from_anyhow(&err.unwrap_err());
        assert_eq!(exit.code, SERVICE_UNAVAILABLE);
        assert!(exit.message.unwrap().contains("timed out after 60s"));

        let err = anyhow::Error::new(AnalysisError::Status {
            status: 401,
            body: "bad key".into(),
        });
        assert_eq!(ExitCode::from_anyhow(&err).code, SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_cancelled() {
        let err = anyhow::Error::new(AnalysisError::Cancelled);
        assert_eq!(ExitCode::from_anyhow(&err).code, CANCELLED);
    }

    #[test]
    fn test_io_and_general() {
        let err = anyhow::anyhow!("disk full").context("Failed to write history");
        assert_eq!(ExitCode::from_anyhow(&err).code, IO_ERROR);

        let storage = StorageError::Io(std::io::Error::other("read-only file system"));
        let err = anyhow::Error::new(storage).context("Could not record scan");
        assert_eq!(ExitCode::from_anyhow(&err).code, IO_ERROR);

        let err = anyhow::Error::new(AnalysisError::Config("OPENAI_API_KEY not set".into()));
        assert_eq!(ExitCode::from_anyhow(&err).code, GENERAL_ERROR);
    }
}
