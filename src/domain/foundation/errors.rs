//! Error types for the domain layer.

use thiserror::Error;

/// Errors raised when a value does not have the shape or range a field requires.
///
/// Used both for value-object construction and for rejecting structurally
/// valid but semantically wrong model output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' is missing")]
    MissingField { field: String },

    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be {expected}")]
    WrongType { field: String, expected: &'static str },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a missing field validation error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        ValidationError::MissingField { field: field.into() }
    }

    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates a wrong type validation error.
    pub fn wrong_type(field: impl Into<String>, expected: &'static str) -> Self {
        ValidationError::WrongType {
            field: field.into(),
            expected,
        }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::EmptyField { field }
            | ValidationError::WrongType { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_names_field_and_bounds() {
        let err = ValidationError::out_of_range("confidence", 0.0, 1.0, 1.5);
        assert_eq!(
            err.to_string(),
            "Field 'confidence' must be between 0 and 1, got 1.5"
        );
        assert_eq!(err.field(), "confidence");
    }

    #[test]
    fn wrong_type_names_expected_shape() {
        let err = ValidationError::wrong_type("pages", "an array");
        assert_eq!(err.to_string(), "Field 'pages' must be an array");
    }

    #[test]
    fn missing_field_displays_field() {
        let err = ValidationError::missing_field("isComplete");
        assert!(err.to_string().contains("isComplete"));
    }
}
