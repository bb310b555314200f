//! MaxMind GeoLite2/GeoIP2 Country database lookup.

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use maxminddb::{geoip2, MaxMindDBError, Reader};
use thiserror::Error;

use crate::lookup::{GeoLookup, GeoRecord, LookupError};

/// Errors that can occur while opening a database.
#[derive(Error, Debug)]
pub enum GeoIpError {
    #[error("Failed to open GeoIP database: {0}")]
    DatabaseOpen(#[from] MaxMindDBError),

    #[error("Database file not found: {0}")]
    NotFound(String),
}

#[derive(Clone)]
pub struct MaxMindLookup {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindLookup {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GeoIpError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GeoIpError::NotFound(path.display().to_string()));
        }

        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    /// Load a database from bytes (useful for embedded databases).
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, GeoIpError> {
        let reader = Reader::from_source(data)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    fn lookup_ip(&self, ip: IpAddr) -> Result<Option<GeoRecord>, LookupError> {
        from_lookup(self.reader.lookup::<geoip2::Country>(ip))
    }
}

/// Only literal IP addresses have database records; hostnames resolve to nothing.
fn parse_address(address: &str) -> Option<IpAddr> {
    address.parse().ok()
}

fn from_lookup(
    result: Result<geoip2::Country<'_>, MaxMindDBError>,
) -> Result<Option<GeoRecord>, LookupError> {
    match result {
        Ok(record) => Ok(record.country.and_then(record_from)),
        Err(MaxMindDBError::AddressNotFoundError(_)) => Ok(None),
        Err(e) => Err(LookupError::Unavailable(e.to_string())),
    }
}

fn record_from(country: geoip2::country::Country<'_>) -> Option<GeoRecord> {
    let record = GeoRecord {
        country: country
            .names
            .and_then(|names| names.get("en").map(|s| s.to_string())),
        iso_code: country.iso_code.map(String::from),
    };
    (record.country.is_some() || record.iso_code.is_some()).then_some(record)
}

#[async_trait]
impl GeoLookup for MaxMindLookup {
    async fn lookup(&self, address: &str) -> Result<Option<GeoRecord>, LookupError> {
        match parse_address(address) {
            Some(ip) => self.lookup_ip(ip),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_missing_database() {
        let dir = std::env::temp_dir().join("authscan-no-such-dir");
        let err = MaxMindLookup::open(dir.join("GeoLite2-Country.mmdb")).err();
        assert!(matches!(err, Some(GeoIpError::NotFound(_))));
    }

    #[test]
    fn test_garbage_database() {
        let err = MaxMindLookup::from_bytes(b"not a maxmind database".to_vec()).err();
        assert!(matches!(err, Some(GeoIpError::DatabaseOpen(_))));
    }

    fn country(
        iso_code: Option<&'static str>,
        en: Option<&'static str>,
    ) -> geoip2::country::Country<'static> {
        geoip2::country::Country {
            geoname_id: None,
            is_in_european_union: None,
            iso_code,
            names: en.map(|name| BTreeMap::from([("de", "Niederlande"), ("en", name)])),
        }
    }

    #[test]
    fn test_record_uses_english_name_and_iso_code() {
        let record = record_from(country(Some("NL"), Some("Netherlands"))).unwrap();
        assert_eq!(record.country.as_deref(), Some("Netherlands"));
        assert_eq!(record.iso_code.as_deref(), Some("NL"));
        assert_eq!(record.label().as_deref(), Some("Netherlands"));
    }

    #[test]
    fn test_record_without_english_name() {
        let record = record_from(country(Some("BR"), None)).unwrap();
        assert_eq!(record.country, None);
        assert_eq!(record.label().as_deref(), Some("BR"));

        assert_eq!(record_from(country(None, None)), None);
    }

    #[test]
    fn test_address_not_found_is_empty() {
        let result = from_lookup(Err(MaxMindDBError::AddressNotFoundError(
            "Address not found in database".into(),
        )));
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_database_errors_are_unavailable() {
        let result = from_lookup(Err(MaxMindDBError::InvalidDatabaseError("bad node".into())));
        assert!(matches!(result, Err(LookupError::Unavailable(msg)) if msg.contains("bad node")));
    }

    #[test]
    fn test_only_ip_literals_are_looked_up() {
        assert_eq!(parse_address("10.0.0.5"), Some(IpAddr::from([10, 0, 0, 5])));
        assert!(parse_address("2001:db8::1").is_some());
        assert_eq!(parse_address("scanner.example.net"), None);
        assert_eq!(parse_address("10.0.0.5:22"), None);
    }
}
