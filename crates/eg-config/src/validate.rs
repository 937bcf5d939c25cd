//! Configuration validation errors and semantic validation.

use crate::file::ConfigFile;
use eg_redact::{FieldClass, RedactionPolicy};
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate a configuration file semantically.
pub fn validate_file(file: &ConfigFile) -> ValidationResult<()> {
    let expected_major = crate::CONFIG_SCHEMA_VERSION
        .split('.')
        .next()
        .unwrap_or_default();
    if file.schema_version.split('.').next() != Some(expected_major) {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: file.schema_version.clone(),
        });
    }

    if let Some(env) = &file.environment {
        if env.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "environment".to_string(),
                message: "must not be blank".to_string(),
            });
        }
    }

    let section = &file.redaction;
    validate_names("redaction.hidden_parameters", &section.hidden_parameters)?;
    validate_names("redaction.hidden_headers", &section.hidden_headers)?;
    validate_names(
        "redaction.hidden_response_parameters",
        &section.hidden_response_parameters,
    )?;
    for (idx, name) in section.hidden_headers.iter().enumerate() {
        if name.contains(':') {
            return Err(ValidationError::InvalidValue {
                field: format!("redaction.hidden_headers[{}]", idx),
                message: format!("header name must not contain ':', got {:?}", name),
            });
        }
    }
    if let Some(placeholder) = &section.placeholder {
        validate_placeholder(placeholder)?;
    }

    validate_names("monitored_tags", &file.monitored_tags)?;

    Ok(())
}

/// Validate the effective redaction policy.
///
/// Empty name sets are allowed and logged as warnings.
pub fn validate_policy(policy: &RedactionPolicy) -> ValidationResult<()> {
    validate_placeholder(&policy.placeholder)?;

    for class in FieldClass::ALL {
        let names: Vec<String> = policy.names_for(class).iter().cloned().collect();
        validate_names(&format!("redaction.{}", class), &names)?;
    }

    if policy.hidden_parameters.is_empty() {
        tracing::warn!("no request parameters are hidden");
    }
    if policy.hidden_headers.is_empty() {
        tracing::warn!("no request headers are hidden");
    }
    Ok(())
}

fn validate_placeholder(placeholder: &str) -> ValidationResult<()> {
    if placeholder.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "redaction.placeholder".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_names(field: &str, names: &[String]) -> ValidationResult<()> {
    for (idx, name) in names.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("{}[{}]", field, idx),
                message: "must not be blank".to_string(),
            });
        }
        if name.trim() != name {
            return Err(ValidationError::InvalidValue {
                field: format!("{}[{}]", field, idx),
                message: format!("leading or trailing whitespace in {:?}", name),
            });
        }
    }
    Ok(())
}
