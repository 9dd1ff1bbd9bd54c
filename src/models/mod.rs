//! Domain records and the HTTP request/response models
//!
//! The classifier record itself plus the DTOs used for serializing and
//! deserializing HTTP bodies.

pub mod classifier;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use classifier::{Classifier, ClassifierPage, NewClassifier, MAX_NAME_LENGTH};
pub use requests::{CreateClassifierRequest, ListQuery};
pub use responses::{
    CacheMetrics, ClassifierEnvelope, CreateClassifierResponse, CreatedClassifier, ErrorResponse,
    GetClassifierResponse, HealthResponse, HomeResponse, ListMetadata, ListResponse,
    MetricsResponse,
};
