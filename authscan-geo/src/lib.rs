//! # Authscan Geo
//!
//! Best-effort country enrichment for offending addresses.
//!
//! The lookup source is an injected [`GeoLookup`] capability, so the enricher can
//! run against a MaxMind database, nothing at all, or a test double.

pub mod enricher;
pub mod lookup;
pub mod maxmind;

pub use enricher::{EnricherOptions, GeoEnricher};
pub use lookup::{GeoLookup, GeoRecord, LookupError, NullLookup};
pub use maxmind::MaxMindLookup;
