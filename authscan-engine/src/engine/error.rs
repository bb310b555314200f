use std::io;

use thiserror::Error;
use tokio::task::JoinError;

use authscan_core::ScanError;
use authscan_detection::DetectionError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Invalid failure pattern: {0}")]
    Pattern(#[from] DetectionError),

    #[error("Failed to write report to {target}: {source}")]
    Output {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("Processing error: {0}")]
    Processing(String),
}

impl From<JoinError> for EngineError {
    fn from(err: JoinError) -> Self {
        EngineError::Processing(err.to_string())
    }
}
