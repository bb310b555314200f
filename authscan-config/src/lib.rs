//! # Authscan Configuration System
//!
//! Layered configuration for a scan run.
//!
//! ## Features
//! - **Unified Configuration**: one struct for scanner, report, geo and telemetry settings
//! - **Validation**: range and pattern checks before any work starts
//! - **Environment Awareness**: per-environment YAML overrides and `AUTHSCAN_*` variables

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

mod error;
mod geo;
mod report;
mod scan;
mod telemetry;
mod validation;

pub use error::ConfigError;
pub use geo::GeoConfig;
pub use report::ReportConfig;
pub use scan::ScanConfig;
pub use telemetry::TelemetryConfig;

const BASE_FILE: &str = "config/authscan.yaml";
const ENV_PREFIX: &str = "AUTHSCAN_";

/// Top‑level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct AuthscanConfig {
    /// Log source and line matching.
    #[validate(nested)]
    #[serde(default)]
    pub scan: ScanConfig,

    /// Threshold and report output.
    #[validate(nested)]
    #[serde(default)]
    pub report: ReportConfig,

    /// Geolocation enrichment.
    #[validate(nested)]
    #[serde(default)]
    pub geo: GeoConfig,

    /// Logging.
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AuthscanConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default Values
    /// 2. `config/authscan.yaml` - Base settings. If missing, defaults are used.
    /// 3. `config/<AUTHSCAN_ENV>.yaml` - Environment‑specific overrides.
    /// 4. `AUTHSCAN_*` environment variables (`__` separates sections).
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(AuthscanConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        } else {
            debug!("{BASE_FILE} not found, using default configuration");
        }

        let env = std::env::var("AUTHSCAN_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::finish(figment)
    }

    /// Load configuration from a specific file, still honouring `AUTHSCAN_*` variables.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let figment = Figment::from(Serialized::defaults(AuthscanConfig::default()))
            .merge(Yaml::file(path));
        Self::finish(figment)
    }

    /// Re-validates after programmatic changes (e.g. command-line overrides).
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate().map_err(ConfigError::from)
    }

    fn finish(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
