//! Error types for configuration loading and validation

use std::path::PathBuf;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Unified configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File not found error.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Configuration validation error.
    #[error("Invalid configuration:\n{}", format_validation_errors(.0))]
    Validation(#[source] ValidationErrors),

    /// Figment parsing error.
    #[error("Configuration parsing error: {0}")]
    Parsing(#[from] figment::Error),
}

fn describe(error: &ValidationError) -> String {
    match &error.message {
        Some(msg) => msg.to_string(),
        None => error.code.to_string(),
    }
}

// Sections are nested structs, so walk one level down to reach the field errors.
fn format_validation_errors(errors: &ValidationErrors) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(errors) => {
                let _ = writeln!(output, "Field '{}':", field);
                for error in errors {
                    let _ = writeln!(output, "  - {}", describe(error));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                for (nested_field, nested_errors) in nested.field_errors() {
                    let _ = writeln!(output, "Field '{}.{}':", field, nested_field);
                    for error in nested_errors {
                        let _ = writeln!(output, "  - {}", describe(error));
                    }
                }
            }
            ValidationErrorsKind::List(_) => {
                let _ = writeln!(output, "Field '{}': invalid entry", field);
            }
        }
    }
    output
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}
