//! # Authscan Detection
//!
//! Recognises authentication-failure lines and pulls the source address out of them.

pub mod failure;

pub use failure::{DetectionError, FailureMatcher, LineMatch};
pub use failure::{DEFAULT_MARKER, DEFAULT_PATTERN};
