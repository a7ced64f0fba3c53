//! Configuration Error Types
//!
//! Errors raised while seeding workflow settings from an external source or
//! while validating them at build time. Queries on built settings never fail.

use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A key is present but its value cannot be used
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },

    /// The source failed while reading a key
    #[error("Failed to read configuration key '{key}': {error}")]
    SourceError { key: String, error: String },

    /// Layered configuration could not be assembled
    #[error("Failed to load configuration: {error}")]
    LoadError { error: String },

    /// Built values violate a constraint
    #[error("Configuration validation failed: {error}")]
    ValidationError { error: String },
}

impl ConfigurationError {
    /// Create an invalid value error
    pub fn invalid_value<F: Into<String>, V: Into<String>, C: Into<String>>(
        field: F,
        value: V,
        context: C,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            context: context.into(),
        }
    }

    /// Create a source read error
    pub fn source_error<K: Into<String>, E: std::fmt::Display>(key: K, error: E) -> Self {
        Self::SourceError {
            key: key.into(),
            error: error.to_string(),
        }
    }

    /// Create a load error
    pub fn load_error<E: std::fmt::Display>(error: E) -> Self {
        Self::LoadError {
            error: error.to_string(),
        }
    }

    /// Create a validation error
    pub fn validation_error<E: std::fmt::Display>(error: E) -> Self {
        Self::ValidationError {
            error: error.to_string(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigurationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_message() {
        let error = ConfigurationError::invalid_value(
            "workflow.max.state.retries",
            "many",
            "expected an unsigned integer",
        );
        assert_eq!(
            error.to_string(),
            "Invalid value 'many' for field 'workflow.max.state.retries': expected an unsigned integer"
        );
    }

    #[test]
    fn test_validation_error_message() {
        let error = ConfigurationError::validation_error("min exceeds max");
        assert_eq!(
            error.to_string(),
            "Configuration validation failed: min exceeds max"
        );
    }
}
