//! Log source and line-matching parameters.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Scanner configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ScanConfig {
    /// Authentication log to analyse.
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    /// Literal prefilter markers; a line must contain one to be considered.
    #[validate(custom(function = validation::validate_markers))]
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,

    /// Address pattern; the first capture group is the source address.
    #[validate(custom(function = validation::validate_pattern))]
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Scan workers. `1` streams the log; `0` uses one worker per CPU.
    #[validate(range(max = 256))]
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_log_path() -> PathBuf {
    PathBuf::from("/var/log/auth.log")
}

fn default_markers() -> Vec<String> {
    vec![authscan_detection::DEFAULT_MARKER.to_string()]
}

fn default_pattern() -> String {
    authscan_detection::DEFAULT_PATTERN.to_string()
}

fn default_workers() -> usize {
    1
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            markers: default_markers(),
            pattern: default_pattern(),
            workers: default_workers(),
        }
    }
}
