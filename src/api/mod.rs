//! API Module
//!
//! HTTP handlers and routing for the classifier REST API.
//!
//! # Endpoints
//! - `GET /` - Service banner
//! - `POST /classifiers/create` - Create a classifier
//! - `GET /classifiers` - Paginated listing, newest first
//! - `GET /classifiers/:id` - Single classifier
//! - `GET /debug/metrics` - Connection-pool and cache counters
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
