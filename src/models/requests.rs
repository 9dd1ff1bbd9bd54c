//! Request DTOs for the classifier API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::NewClassifier;
use crate::repository::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Request body for POST /classifiers/create
///
/// Omitted optional fields stay absent; an explicit `""` or `false` is kept.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClassifierRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl From<CreateClassifierRequest> for NewClassifier {
    fn from(req: CreateClassifierRequest) -> Self {
        NewClassifier {
            name: req.name,
            description: req.description,
            is_active: req.is_active,
        }
    }
}

/// Query string for GET /classifiers
///
/// Kept as raw strings so malformed numbers become a JSON 400 rather than a
/// plain-text extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl ListQuery {
    /// Parses and range-checks the pagination parameters.
    ///
    /// Returns `(page, page_size)`, defaulting to `(1, 20)` when absent.
    pub fn pagination(&self) -> Result<(i64, i64)> {
        let page = match self.page.as_deref() {
            None | Some("") => 1,
            Some(raw) => match raw.parse::<i64>() {
                Ok(page) if page >= 1 => page,
                _ => return Err(AppError::validation("invalid page parameter")),
            },
        };

        let page_size = match self.page_size.as_deref() {
            None | Some("") => DEFAULT_PAGE_SIZE,
            Some(raw) => match raw.parse::<i64>() {
                Ok(size) if (1..=MAX_PAGE_SIZE).contains(&size) => size,
                _ => return Err(AppError::validation("invalid page_size parameter")),
            },
        };

        Ok((page, page_size))
    }
}
