//! Validation error types for boundary input (query strings, CLI args)

use std::fmt;

/// Validation error for request parameters
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field is not a number
    NotNumeric { field: &'static str, value: String },

    /// Number outside the accepted range
    OutOfRange { field: &'static str, reason: &'static str },

    /// Invalid enum variant
    InvalidVariant { field: &'static str, value: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::NotNumeric { field, value } => {
                write!(f, "{} must be a number, got '{}'", field, value)
            }
            Self::OutOfRange { field, reason } => write!(f, "{}: {}", field, reason),
            Self::InvalidVariant { field, value } => {
                write!(f, "invalid {} value: '{}'", field, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
