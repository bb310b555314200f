use std::fmt::Display;
use std::io;

use thiserror::Error;

/// Fatal scan failures. Any of these ends the run before a report is built.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Log source unavailable: {name}: {source}")]
    SourceUnavailable {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Scan worker panicked")]
    WorkerPanicked,
}

impl ScanError {
    pub fn unavailable(name: impl Display, source: io::Error) -> Self {
        ScanError::SourceUnavailable {
            name: name.to_string(),
            source,
        }
    }
}

/// A line that carried a failure marker but no usable address. Skipped, never fatal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Malformed failure line {line_number}: no source address")]
pub struct MalformedLine {
    pub line_number: u64,
}
