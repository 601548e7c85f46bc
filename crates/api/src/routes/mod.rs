//! Request handlers

pub mod analytics;
pub mod combinations;
pub mod components;
pub mod export;
pub mod health;
pub mod passports;

use crate::error::ApiResult;
use data_validator::Validator;
use serde::{Deserialize, Serialize};
use storage::Page;

/// Largest page a list endpoint returns
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Records to skip
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

impl ListQuery {
    /// Check bounds and convert to a storage page
    pub fn page(&self, validator: &Validator) -> ApiResult<Page> {
        validator.validate_range("limit", self.limit as f64, (1.0, MAX_PAGE_LIMIT as f64))?;
        Ok(Page::new(self.limit, self.offset))
    }
}

/// Acknowledgement for create operations
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
