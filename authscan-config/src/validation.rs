//! Custom validation functions for configuration.

use regex::Regex;
use validator::ValidationError;

/// The address pattern must compile and expose a capture group for the address.
pub fn validate_pattern(pattern: &str) -> Result<(), ValidationError> {
    let re = Regex::new(pattern).map_err(|_| ValidationError::new("invalid_regex"))?;
    if re.captures_len() < 2 {
        return Err(ValidationError::new("missing_capture_group"));
    }
    Ok(())
}

/// At least one marker, and no empty ones.
pub fn validate_markers(markers: &[String]) -> Result<(), ValidationError> {
    if markers.is_empty() || markers.iter().any(|m| m.trim().is_empty()) {
        return Err(ValidationError::new("empty_marker"));
    }
    Ok(())
}

/// Validate logging level.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid = ["trace", "debug", "info", "warn", "error"]
        .contains(&level.to_lowercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}
