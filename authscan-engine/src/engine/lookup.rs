//! Builds the geo lookup capability from configuration.

use std::sync::Arc;

use tracing::{info, warn};

use authscan_config::GeoConfig;
use authscan_geo::{GeoLookup, MaxMindLookup, NullLookup};

/// Opens the configured database. Geolocation is best-effort: a missing or
/// unreadable database degrades to [`NullLookup`] instead of failing the run.
pub fn open_lookup(config: &GeoConfig) -> Arc<dyn GeoLookup> {
    let Some(path) = &config.database else {
        info!("No geo database configured; origins will be reported as Unknown");
        return Arc::new(NullLookup);
    };

    match MaxMindLookup::open(path) {
        Ok(lookup) => {
            info!("Loaded geo database {}", path.display());
            Arc::new(lookup)
        }
        Err(e) => {
            warn!("{e}; origins will be reported as Unknown");
            Arc::new(NullLookup)
        }
    }
}
