//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against the
//! in-memory store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use classifier_service::{
    api::create_router, store::MemoryClassifierStore, AppState, ClassifierRepository,
    RepositoryConfig, StatsSampler,
};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> (Router, Arc<MemoryClassifierStore>) {
    let store = Arc::new(MemoryClassifierStore::new());
    let repository = Arc::new(ClassifierRepository::new(
        store.clone(),
        RepositoryConfig::default(),
    ));
    let sampler = Arc::new(StatsSampler::spawn(
        store.clone(),
        Duration::from_secs(10),
    ));
    (create_router(AppState::new(repository, sampler)), store)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn create(app: &Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/classifiers/create")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

fn listed_names(json: &Value) -> Vec<String> {
    json["data"]["classifiers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect()
}

// == HOME Endpoint Tests ==

#[tokio::test]
async fn test_home_endpoint() {
    let (app, _store) = create_test_app();

    let (status, json) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Welcome to the Classifier API");
    assert_eq!(json["status"], "available");
}

// == CREATE Endpoint Tests ==

#[tokio::test]
async fn test_create_endpoint_success() {
    let (app, _store) = create_test_app();

    let (status, json) = create(&app, r#"{"name":"spam","is_active":true}"#).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["classifier"]["id"], 1);
    assert_eq!(json["classifier"]["name"], "spam");
    assert_eq!(json["classifier"]["is_active"], true);
    assert!(json["classifier"]["description"].is_null());
}

#[tokio::test]
async fn test_create_endpoint_empty_name() {
    let (app, _store) = create_test_app();

    let (status, json) = create(&app, r#"{"name":""}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_invalid_json_request() {
    let (app, _store) = create_test_app();

    let (status, json) = create(&app, "not valid json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let (app, _store) = create_test_app();
    create(&app, r#"{"name":"spam","description":"junk mail"}"#).await;

    let (status, json) = get(&app, "/classifiers/1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["classifier"]["name"], "spam");
    assert_eq!(json["classifier"]["description"], "junk mail");
    assert!(json["classifier"]["created_at"].is_string());
}

#[tokio::test]
async fn test_get_endpoint_served_from_cache() {
    let (app, store) = create_test_app();
    create(&app, r#"{"name":"spam"}"#).await;

    get(&app, "/classifiers/1").await;
    let reads = store.read_count();
    let (status, _) = get(&app, "/classifiers/1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.read_count(), reads);
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let (app, store) = create_test_app();

    let (first, json) = get(&app, "/classifiers/999").await;
    let (second, _) = get(&app, "/classifiers/999").await;

    assert_eq!(first, StatusCode::NOT_FOUND);
    assert_eq!(second, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("999"));
    assert_eq!(store.read_count(), 2, "misses are never cached");
}

#[tokio::test]
async fn test_get_endpoint_bad_id() {
    let (app, _store) = create_test_app();

    for uri in ["/classifiers/abc", "/classifiers/0", "/classifiers/-1"] {
        let (status, json) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(json.get("error").is_some());
    }
}

#[tokio::test]
async fn test_optional_fields_round_trip() {
    let (app, _store) = create_test_app();
    create(&app, r#"{"name":"bare"}"#).await;
    create(&app, r#"{"name":"empty","description":"","is_active":false}"#).await;

    for _ in 0..2 {
        let (_, bare) = get(&app, "/classifiers/1").await;
        assert!(bare["classifier"].get("description").is_none());
        assert!(bare["classifier"].get("is_active").is_none());

        let (_, empty) = get(&app, "/classifiers/2").await;
        assert_eq!(empty["classifier"]["description"], "");
        assert_eq!(empty["classifier"]["is_active"], false);
    }
}

// == LIST Endpoint Tests ==

#[tokio::test]
async fn test_list_endpoint_defaults() {
    let (app, _store) = create_test_app();
    create(&app, r#"{"name":"A"}"#).await;

    let (status, json) = get(&app, "/classifiers").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["metadata"]["page"], 1);
    assert_eq!(json["data"]["metadata"]["page_size"], 20);
    assert_eq!(json["data"]["metadata"]["total"], 1);
    assert_eq!(json["data"]["metadata"]["pages"], 1);
}

#[tokio::test]
async fn test_list_endpoint_invalidated_by_create() {
    let (app, store) = create_test_app();
    for name in ["A", "B", "C"] {
        create(&app, &format!(r#"{{"name":"{}"}}"#, name)).await;
    }

    let (_, first) = get(&app, "/classifiers?page=1&page_size=2").await;
    assert_eq!(listed_names(&first), vec!["C", "B"]);
    assert_eq!(first["data"]["metadata"]["total"], 3);

    let reads = store.read_count();
    let (_, cached) = get(&app, "/classifiers?page=1&page_size=2").await;
    assert_eq!(store.read_count(), reads);
    assert_eq!(cached, first);

    create(&app, r#"{"name":"D"}"#).await;

    let (_, refreshed) = get(&app, "/classifiers?page=1&page_size=2").await;
    assert_eq!(listed_names(&refreshed), vec!["D", "C"]);
    assert_eq!(refreshed["data"]["metadata"]["total"], 4);
    assert_eq!(refreshed["data"]["metadata"]["pages"], 2);
}

#[tokio::test]
async fn test_list_endpoint_bad_pagination() {
    let (app, _store) = create_test_app();

    for uri in [
        "/classifiers?page=0",
        "/classifiers?page=x",
        "/classifiers?page_size=0",
        "/classifiers?page_size=101",
    ] {
        let (status, _) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}

// == METRICS Endpoint Tests ==

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _store) = create_test_app();
    create(&app, r#"{"name":"A"}"#).await;
    get(&app, "/classifiers/1").await;
    get(&app, "/classifiers/1").await;

    let (status, json) = get(&app, "/debug/metrics").await;

    assert_eq!(status, StatusCode::OK);
    for field in [
        "open_connections",
        "in_use_connections",
        "wait_count",
        "max_idle_closed",
    ] {
        assert!(json["metrics"].get(field).is_some(), "missing {}", field);
    }
    assert_eq!(json["cache"]["hits"], 1);
    assert_eq!(json["cache"]["misses"], 1);
    assert_eq!(json["cache"]["total_entries"], 1);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _store) = create_test_app();

    let (status, json) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
