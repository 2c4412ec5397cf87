//! Validation error types

use thiserror::Error;

/// Validation error for domain models
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Field exceeds maximum length
    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., hex color, URL)
    #[error("{field}: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },

    /// Invalid enum variant
    #[error("invalid {field} value: '{value}'")]
    InvalidVariant { field: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "label name",
            max: 64,
        };
        assert_eq!(
            err.to_string(),
            "label name exceeds maximum length of 64 characters"
        );

        let err = ValidationError::InvalidVariant {
            field: "integration",
            value: "instapaper".into(),
        };
        assert_eq!(err.to_string(), "invalid integration value: 'instapaper'");
    }
}
