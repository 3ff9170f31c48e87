// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /v1/predict tests (JSON body with base64 image)

use anemia_screen::{
    api::{create_app, AppState, ErrorResponse, PredictResponse},
    config::ScreeningConfig,
    screening::{ScreeningEngine, ScreeningStatus},
    vision::{NormalizedTensor, ScoringFunction},
};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::io::Cursor;
use std::sync::Arc;
use tower::util::ServiceExt;

struct FixedScorer(f32);

impl ScoringFunction for FixedScorer {
    fn score(&self, _input: &NormalizedTensor) -> anyhow::Result<f32> {
        Ok(self.0)
    }
}

fn gray_png_base64() -> String {
    let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(90, 60, Luma([128])));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    STANDARD.encode(buffer.into_inner())
}

fn json_request(body: String) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/v1/predict")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn app_with_score(raw_score: f32) -> axum::Router {
    let engine = ScreeningEngine::with_scorer(Arc::new(FixedScorer(raw_score)), "mock.onnx");
    create_app(AppState::new(engine, ScreeningConfig::default()).unwrap())
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_base64_prediction() {
    let app = app_with_score(0.2);
    let body = serde_json::json!({ "image": gray_png_base64() }).to_string();

    let response = app.oneshot(json_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let verdict: PredictResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(verdict.status, ScreeningStatus::AnemiaSuspected);
    assert!((verdict.confidence.anemia - 0.8).abs() < 1e-6);
}

#[tokio::test]
async fn test_missing_image_field() {
    let app = app_with_score(0.2);

    let response = app.oneshot(json_request("{}".to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(error.error_type, "validation_error");
}

#[tokio::test]
async fn test_invalid_base64() {
    let app = app_with_score(0.2);
    let body = serde_json::json!({ "image": "!!!not-base64!!!" }).to_string();

    let response = app.oneshot(json_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(error.error_type, "invalid_image");
}

#[tokio::test]
async fn test_base64_of_non_image() {
    let app = app_with_score(0.2);
    let body = serde_json::json!({ "image": STANDARD.encode(b"plain text payload") }).to_string();

    let response = app.oneshot(json_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json() {
    let app = app_with_score(0.2);

    let response = app
        .oneshot(json_request("{\"image\": ".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unloaded_model() {
    let app = create_app(AppState::new_for_test().unwrap());
    let body = serde_json::json!({ "image": gray_png_base64() }).to_string();

    let response = app.oneshot(json_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
