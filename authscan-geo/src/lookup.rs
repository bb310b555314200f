//! The geolocation capability seen by the enricher.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    /// The collaborator could not answer for this address.
    #[error("Geo lookup unavailable: {0}")]
    Unavailable(String),

    #[error("Geo lookup timed out after {0:?}")]
    Timeout(Duration),
}

/// What a lookup knows about an address. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoRecord {
    /// English country name.
    pub country: Option<String>,
    /// ISO 3166-1 alpha-2 code.
    pub iso_code: Option<String>,
}

impl GeoRecord {
    /// The label shown in the report: name, then ISO code.
    pub fn label(self) -> Option<String> {
        self.country
            .filter(|c| !c.is_empty())
            .or(self.iso_code.filter(|c| !c.is_empty()))
    }
}

/// A source of geographic records. `Ok(None)` means "no record".
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn lookup(&self, address: &str) -> Result<Option<GeoRecord>, LookupError>;
}

/// Knows nothing about any address.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLookup;

#[async_trait]
impl GeoLookup for NullLookup {
    async fn lookup(&self, _address: &str) -> Result<Option<GeoRecord>, LookupError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_prefers_name() {
        let record = GeoRecord {
            country: Some("Germany".into()),
            iso_code: Some("DE".into()),
        };
        assert_eq!(record.label().as_deref(), Some("Germany"));
    }

    #[test]
    fn test_label_falls_back_to_iso_code() {
        let record = GeoRecord {
            country: None,
            iso_code: Some("DE".into()),
        };
        assert_eq!(record.label().as_deref(), Some("DE"));
        assert_eq!(GeoRecord::default().label(), None);
    }
}
