//! Classifier domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::pool::Poolable;

/// Longest accepted classifier name, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

// == Classifier ==
/// A stored classifier record.
///
/// `description` and `is_active` are nullable columns: `None` means the value
/// was never supplied, which is distinct from `Some("")` or `Some(false)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classifier {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl Poolable for Classifier {
    fn reset(&mut self) {
        self.id = 0;
        // a released record keeps its name buffer for the next acquire
        self.name.clear();
        self.description = None;
        self.is_active = None;
        self.created_at = DateTime::<Utc>::default();
    }
}

// == Classifier Page ==
/// One page of a listing together with the total row count.
///
/// Cached as a unit so a cache hit always reports the total that was read
/// alongside the records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassifierPage {
    pub classifiers: Vec<Classifier>,
    pub total: i64,
}

impl ClassifierPage {
    /// Number of pages of `page_size` needed to show `total` rows.
    pub fn page_count(&self, page_size: i64) -> i64 {
        if page_size <= 0 {
            return 0;
        }
        (self.total + page_size - 1) / page_size
    }
}

// == New Classifier ==
/// Input for creating a classifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewClassifier {
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl NewClassifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Checks required fields.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("name is required"));
        }
        if self.name.chars().count() > MAX_NAME_LENGTH {
            return Err(AppError::validation(format!(
                "name exceeds maximum length of {} characters",
                MAX_NAME_LENGTH
            )));
        }
        Ok(())
    }
}
