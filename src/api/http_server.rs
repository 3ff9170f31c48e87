// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::handlers::{config_handler, health_handler, metrics_handler, root_handler};
use super::predict::{predict_base64_handler, predict_upload_handler};
use crate::config::ScreeningConfig;
use crate::monitoring::ScreeningMetrics;
use crate::screening::ScreeningEngine;

/// Headroom for multipart framing and base64 inflation on top of the raw image limit
const BODY_LIMIT_OVERHEAD: usize = 64 * 1024;

/// Shared state handed to every handler; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ScreeningEngine>,
    pub config: Arc<ScreeningConfig>,
    pub metrics: ScreeningMetrics,
}

impl AppState {
    pub fn new(engine: ScreeningEngine, config: ScreeningConfig) -> Result<Self> {
        Ok(Self {
            engine: Arc::new(engine),
            config: Arc::new(config),
            metrics: ScreeningMetrics::new()?,
        })
    }

    /// State with default config and no classifier loaded
    pub fn new_for_test() -> Result<Self> {
        let config = ScreeningConfig::default();
        let engine = ScreeningEngine::unavailable(config.model_path.clone(), "not loaded");
        Self::new(engine, config)
    }
}

fn cors_layer(config: &ScreeningConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

pub fn create_app(state: AppState) -> Router {
    // base64 bodies are 4/3 the size of the image they carry
    let body_limit = state.config.max_file_size / 3 * 4 + BODY_LIMIT_OVERHEAD;

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/predict", post(predict_upload_handler))
        .route("/v1/predict", post(predict_base64_handler))
        .route("/v1/config", get(config_handler))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(state: AppState) -> Result<()> {
    let addr = state.config.listen_addr()?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Screening API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Screening API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
