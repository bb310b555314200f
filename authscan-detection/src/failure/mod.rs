//! ## authscan-detection::failure
//! **Failed-login line recognition**
//!
//! A line is considered in two steps:
//! - an Aho-Corasick prefilter over the configured markers rejects the bulk of
//!   unrelated log traffic without touching the regex engine;
//! - lines that carry a marker are run through the address pattern, whose first
//!   capture group holds the source address.
//!
//! A marker hit without a usable address is reported as [`LineMatch::Malformed`]
//! so callers can count it and move on.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use regex::Regex;
use thiserror::Error;

/// Literal that every sshd password failure starts with.
pub const DEFAULT_MARKER: &str = "Failed password for";

/// Address extraction pattern. The last ` from ` on a line supplies the address.
pub const DEFAULT_PATTERN: &str = r"Failed password for.* from (\S+)";

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Pattern compilation failed: {0}")]
    PatternError(String),

    #[error("Address pattern `{0}` has no capture group")]
    MissingCaptureGroup(String),

    #[error("At least one non-empty marker is required")]
    NoMarkers,
}

/// Outcome of classifying one log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMatch<'a> {
    /// No failure marker on the line.
    NoMatch,
    /// Failure line with its source address token.
    Address(&'a str),
    /// Failure marker present but no address could be extracted.
    Malformed,
}

#[derive(Debug, Clone)]
pub struct FailureMatcher {
    markers: Vec<String>,
    prefilter: AhoCorasick,
    pattern: Regex,
}

impl FailureMatcher {
    pub fn new<I, S>(markers: I, pattern: &str) -> Result<Self, DetectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers: Vec<String> = markers
            .into_iter()
            .map(Into::into)
            .filter(|m| !m.trim().is_empty())
            .collect();
        if markers.is_empty() {
            return Err(DetectionError::NoMarkers);
        }

        let prefilter = AhoCorasickBuilder::new()
            .build(markers.iter())
            .map_err(|e| DetectionError::PatternError(e.to_string()))?;

        let pattern =
            Regex::new(pattern).map_err(|e| DetectionError::PatternError(e.to_string()))?;
        if pattern.captures_len() < 2 {
            return Err(DetectionError::MissingCaptureGroup(pattern.as_str().to_string()));
        }

        Ok(Self {
            markers,
            prefilter,
            pattern,
        })
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Classify a single line (without its trailing newline).
    #[inline]
    pub fn classify<'a>(&self, line: &'a str) -> LineMatch<'a> {
        if !self.prefilter.is_match(line) {
            return LineMatch::NoMatch;
        }

        // Only the first whitespace-delimited token of the capture counts.
        let address = self
            .pattern
            .captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().split_whitespace().next());

        match address {
            Some(address) => LineMatch::Address(address),
            None => LineMatch::Malformed,
        }
    }
}
