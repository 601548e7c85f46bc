//! Validation Error Types

use thiserror::Error;

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Lower bound of a min/max pair exceeds the upper bound
    #[error("{lower_field} ({lower}) must not exceed {upper_field} ({upper})")]
    InvertedRange {
        lower_field: &'static str,
        lower: f64,
        upper_field: &'static str,
        upper: f64,
    },

    /// Identifier does not match `<PREFIX>[A-Z0-9_-]{1,20}`
    #[error("{field} '{value}' must be '{prefix}' followed by 1-20 characters of A-Z, 0-9, '_' or '-'")]
    InvalidIdentifier {
        field: &'static str,
        value: String,
        prefix: &'static str,
    },

    /// Text length outside the allowed bounds
    #[error("{field} length {len} is out of range [{min}, {max}]")]
    InvalidLength {
        field: &'static str,
        len: usize,
        min: usize,
        max: usize,
    },
}
