//! Response DTOs for the classifier API
//!
//! Defines the JSON envelopes of outgoing HTTP response bodies.

use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::cache::CacheStats;
use crate::models::{Classifier, ClassifierPage};
use crate::store::ConnectionStats;

/// Response body for GET /
#[derive(Debug, Clone, Serialize)]
pub struct HomeResponse {
    pub message: String,
    pub status: String,
}

impl HomeResponse {
    pub fn available() -> Self {
        Self {
            message: "Welcome to the Classifier API".to_string(),
            status: "available".to_string(),
        }
    }
}

/// `{"classifier": ...}` envelope used by create and get.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierEnvelope<T> {
    pub classifier: T,
}

/// Echo of a freshly created classifier.
///
/// Unlike [`Classifier`], absent optionals are rendered as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedClassifier {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Response body for GET /classifiers/:id
pub type GetClassifierResponse = ClassifierEnvelope<Arc<Classifier>>;

/// Response body for POST /classifiers/create
pub type CreateClassifierResponse = ClassifierEnvelope<CreatedClassifier>;

/// Response body for GET /classifiers
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub data: ListData,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListData {
    #[serde(serialize_with = "serialize_page_records")]
    pub classifiers: Arc<ClassifierPage>,
    pub metadata: ListMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListMetadata {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub pages: i64,
}

impl ListResponse {
    pub fn new(page: Arc<ClassifierPage>, page_number: i64, page_size: i64) -> Self {
        let metadata = ListMetadata {
            total: page.total,
            page: page_number,
            page_size,
            pages: page.page_count(page_size),
        };
        Self {
            data: ListData {
                classifiers: page,
                metadata,
            },
        }
    }
}

fn serialize_page_records<S: Serializer>(
    page: &Arc<ClassifierPage>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    page.classifiers.serialize(serializer)
}

/// Response body for GET /debug/metrics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsResponse {
    pub metrics: ConnectionStats,
    pub cache: CacheMetrics,
}

/// Cache counters plus the derived hit rate.
#[derive(Debug, Clone, Serialize)]
pub struct CacheMetrics {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheMetrics {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
