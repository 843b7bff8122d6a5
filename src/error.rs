//! Top-level error type and process exit codes.

use thiserror::Error;

use crate::input::{InputError, UsageError};
use crate::recognition::RecognitionError;
use crate::system::CaptureError;

/// Exit code for invalid or conflicting arguments.
pub const EXIT_USAGE: i32 = 2;
/// Exit code for any input, capture, or recognition failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Recognition(#[from] RecognitionError),
    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl OcrError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}
