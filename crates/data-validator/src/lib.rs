//! Component Record Validation
//!
//! Checks identifiers, names and physical ranges of component records
//! before they reach storage.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationConfig, ValidationResult, Validator};
