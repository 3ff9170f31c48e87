// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Service endpoint tests: /, /health, /v1/config, /metrics

use anemia_screen::{
    api::{create_app, AppState, HealthResponse, RootResponse},
    config::ScreeningConfig,
    screening::ScreeningEngine,
    version,
    vision::{NormalizedTensor, ScoringFunction},
};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

struct FixedScorer;

impl ScoringFunction for FixedScorer {
    fn score(&self, _input: &NormalizedTensor) -> anyhow::Result<f32> {
        Ok(0.5)
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_root_banner() {
    let app = create_app(AppState::new_for_test().unwrap());

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let root: RootResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(root.message, version::SERVICE_NAME);
    assert_eq!(root.version, version::VERSION_NUMBER);
}

#[tokio::test]
async fn test_health_reports_unavailable_model() {
    let app = create_app(AppState::new_for_test().unwrap());

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(health.status, "degraded");
    assert!(!health.model.ready);
    assert_eq!(health.model.error.as_deref(), Some("not loaded"));
}

#[tokio::test]
async fn test_health_reports_ready_model() {
    let engine = ScreeningEngine::with_scorer(Arc::new(FixedScorer), "models/anemia_model.onnx");
    let app = create_app(AppState::new(engine, ScreeningConfig::default()).unwrap());

    let response = app.oneshot(get("/health")).await.unwrap();
    let health: HealthResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();

    assert_eq!(health.status, "healthy");
    assert!(health.model.ready);
    assert_eq!(health.model.path, "models/anemia_model.onnx");
    assert!(health.model.error.is_none());
}

#[tokio::test]
async fn test_config_summary() {
    let config = ScreeningConfig {
        port: 9001,
        prediction_timeout: Duration::from_secs(12),
        ..Default::default()
    };
    let engine = ScreeningEngine::unavailable(config.model_path.clone(), "not loaded");
    let app = create_app(AppState::new(engine, config).unwrap());

    let response = app.oneshot(get("/v1/config")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["model"]["threshold"], 0.1641);
    assert_eq!(json["model"]["classes"], serde_json::json!(["anemia", "non-anemia"]));
    assert_eq!(json["server"]["port"], 9001);
    assert_eq!(json["performance"]["prediction_timeout_secs"], 12);
    assert_eq!(json["upload"]["max_file_size"], 10 * 1024 * 1024);
}

#[tokio::test]
async fn test_metrics_exposition() {
    let state = AppState::new_for_test().unwrap();
    state
        .metrics
        .record("anemia_suspected", Duration::from_millis(30));
    let app = create_app(state);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("screening_requests_total{outcome=\"anemia_suspected\"} 1"));
    assert!(text.contains("screening_duration_seconds_bucket"));
}

#[tokio::test]
async fn test_predict_rejects_get() {
    let app = create_app(AppState::new_for_test().unwrap());

    let response = app.oneshot(get("/predict")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
