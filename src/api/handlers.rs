// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::errors::ApiError;
use super::http_server::AppState;
use crate::config::ConfigSummary;
use crate::screening::ModelStatus;
use crate::version;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" when the classifier is loaded, "degraded" otherwise
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub model: ModelStatus,
}

pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: version::SERVICE_NAME.to_string(),
        version: version::VERSION_NUMBER.to_string(),
    })
}

/// Always answers 200; readiness is reported in the body
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = state.engine.status();
    let status = if model.ready { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: version::VERSION_NUMBER.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        model,
    })
}

pub async fn config_handler(State(state): State<AppState>) -> Json<ConfigSummary> {
    Json(state.config.summary())
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state.metrics.render().map_err(|e| {
        error!("Failed to render metrics: {}", e);
        ApiError::InternalError(format!("Failed to render metrics: {}", e))
    })?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}
