//! API Routes
//!
//! Configures the Axum router with all classifier service endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_classifier_handler, get_classifier_handler, health_handler, home_handler,
    list_classifiers_handler, metrics_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Service banner
/// - `POST /classifiers/create` - Create a classifier
/// - `GET /classifiers` - Paginated listing
/// - `GET /classifiers/:id` - Single classifier
/// - `GET /debug/metrics` - Connection-pool and cache counters
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Compression: gzip when the client accepts it
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(home_handler))
        .route("/classifiers/create", post(create_classifier_handler))
        .route("/classifiers", get(list_classifiers_handler))
        .route("/classifiers/:id", get(get_classifier_handler))
        .route("/debug/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
