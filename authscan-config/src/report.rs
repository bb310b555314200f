//! Report selection and output parameters.

use std::path::PathBuf;

use authscan_core::ReportFormat;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ReportConfig {
    /// Minimum failed attempts for an address to be reported (inclusive).
    #[serde(default = "default_threshold")]
    pub threshold: u64,

    #[serde(default)]
    pub format: ReportFormat,

    /// Write the report here instead of stdout.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

fn default_threshold() -> u64 {
    10
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            format: ReportFormat::default(),
            output: None,
        }
    }
}
