//! Classifier Service - a REST API for classifier records
//!
//! Reads go through an in-process TTL cache in front of a SQLite store;
//! writes go to the store and invalidate the cached listings.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod pool;
pub mod repository;
pub mod store;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{AppError, Result};
pub use repository::{ClassifierRepository, RepositoryConfig};
pub use tasks::StatsSampler;
