//! Values that flow from the scanner into the aggregator.

use serde::Serialize;

/// One raw line and its 1-based position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLine<'a> {
    pub number: u64,
    pub raw: &'a [u8],
}

impl<'a> LogLine<'a> {
    pub fn new(number: u64, raw: &'a [u8]) -> Self {
        Self { number, raw }
    }

    /// The line without its terminator, or `None` if it is not valid UTF-8.
    pub fn text(&self) -> Option<&'a str> {
        let mut raw = self.raw;
        if let Some(rest) = raw.strip_suffix(b"\n") {
            raw = rest;
        }
        if let Some(rest) = raw.strip_suffix(b"\r") {
            raw = rest;
        }
        std::str::from_utf8(raw).ok()
    }
}

/// A single observed authentication failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FailedLoginEvent {
    pub source_address: String,
    pub line_number: u64,
}
