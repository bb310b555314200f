//! Geolocation enrichment parameters.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct GeoConfig {
    /// MaxMind Country database (`.mmdb`). Without one every origin is "Unknown".
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// Maximum lookups in flight.
    #[validate(range(min = 1, max = 256))]
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-lookup deadline in milliseconds.
    #[validate(range(min = 1, max = 60_000))]
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
}

fn default_concurrency() -> usize {
    8
}

fn default_lookup_timeout_ms() -> u64 {
    500
}

impl GeoConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            database: None,
            concurrency: default_concurrency(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
        }
    }
}
