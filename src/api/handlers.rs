//! API Handlers
//!
//! HTTP request handlers for each classifier service endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::{AppError, Result};
use crate::models::{
    CreateClassifierRequest, CreateClassifierResponse, CreatedClassifier, GetClassifierResponse,
    HealthResponse, HomeResponse, ListQuery, ListResponse, MetricsResponse, NewClassifier,
};
use crate::repository::ClassifierRepository;
use crate::tasks::StatsSampler;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache-aside access to classifiers
    pub repository: Arc<ClassifierRepository>,
    /// Latest connection-pool sample for `/debug/metrics`
    pub sampler: Arc<StatsSampler>,
}

impl AppState {
    pub fn new(repository: Arc<ClassifierRepository>, sampler: Arc<StatsSampler>) -> Self {
        Self {
            repository,
            sampler,
        }
    }
}

/// Handler for GET /
pub async fn home_handler() -> Json<HomeResponse> {
    Json(HomeResponse::available())
}

/// Handler for POST /classifiers/create
///
/// Answers 201 with the stored fields echoed back. A body that is not valid
/// JSON for the request shape is a 400.
pub async fn create_classifier_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateClassifierRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateClassifierResponse>)> {
    let Json(req) = payload.map_err(|rejection| AppError::validation(rejection.body_text()))?;

    let new = NewClassifier::from(req);
    let id = state.repository.insert(new.clone()).await?;

    let classifier = CreatedClassifier {
        id,
        name: new.name,
        description: new.description,
        is_active: new.is_active,
    };
    Ok((
        StatusCode::CREATED,
        Json(CreateClassifierResponse { classifier }),
    ))
}

/// Handler for GET /classifiers
pub async fn list_classifiers_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>> {
    let (page, page_size) = query.pagination()?;
    let records = state.repository.list(page, page_size).await?;

    Ok(Json(ListResponse::new(records, page, page_size)))
}

/// Handler for GET /classifiers/:id
pub async fn get_classifier_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<GetClassifierResponse>> {
    let id = raw_id
        .parse::<i64>()
        .ok()
        .filter(|id| *id >= 1)
        .ok_or_else(|| AppError::validation("invalid id parameter"))?;

    let classifier = state.repository.get(id).await?;
    Ok(Json(GetClassifierResponse { classifier }))
}

/// Handler for GET /debug/metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        metrics: state.sampler.snapshot(),
        cache: state.repository.cache_stats().await.into(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
