//! Error types for the classifier service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

// == App Error Enum ==
/// Unified error type for the repository and the HTTP layer.
///
/// Cache operations never produce errors; everything here comes from input
/// validation or the persistent store.
#[derive(Error, Debug)]
pub enum AppError {
    /// No classifier with this identifier
    #[error("Classifier not found: {0}")]
    NotFound(i64),

    /// Malformed input, rejected before touching cache or store
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Any failure reported by the persistent store
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Schema migration failure at startup
    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("classifier {} could not be found", id),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Store(_) | AppError::Migration(_) | AppError::Internal(_) => {
                error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "the server encountered a problem and could not process your request"
                        .to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the classifier service.
pub type Result<T> = std::result::Result<T, AppError>;
