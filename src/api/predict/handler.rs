// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction HTTP handlers

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::multipart::{Multipart, MultipartError};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::request::{PredictRequest, UPLOAD_FIELD};
use super::response::PredictResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::monitoring::OUTCOME_TIMEOUT;
use crate::screening::ScreeningError;
use crate::vision::ImageSource;

/// POST /predict - multipart upload, image in the `file` field
pub async fn predict_upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Malformed multipart body", state.config.max_file_size))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        debug!(
            "Upload received: filename={:?}, content_type={:?}",
            field.file_name(),
            field.content_type()
        );

        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, "Failed to read upload", state.config.max_file_size))?;
        upload = Some(bytes);
        break;
    }

    let bytes = upload.ok_or_else(|| ApiError::ValidationError {
        field: UPLOAD_FIELD.to_string(),
        message: "file is required".to_string(),
    })?;

    if bytes.len() > state.config.max_file_size {
        warn!(
            "Upload rejected: {} bytes exceeds {}",
            bytes.len(),
            state.config.max_file_size
        );
        return Err(ApiError::PayloadTooLarge {
            size: Some(bytes.len()),
            max: state.config.max_file_size,
        });
    }

    let response = screen(&state, ImageSource::Encoded(bytes.to_vec())).await?;
    Ok(Json(response))
}

/// Body-limit overruns surface as multipart read errors carrying 413
fn multipart_error(err: MultipartError, context: &str, max_file_size: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Upload rejected: body exceeds limit ({})", err);
        return ApiError::PayloadTooLarge {
            size: None,
            max: max_file_size,
        };
    }
    ApiError::InvalidRequest(format!("{}: {}", context, err))
}

/// POST /v1/predict - JSON body with a base64 image
pub async fn predict_base64_handler(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    if let Err(e) = request.validate(state.config.max_file_size) {
        warn!("Prediction request validation failed: {}", e);
        return Err(e);
    }

    let encoded = request.image.as_deref().unwrap_or_default();
    let source = ImageSource::from_base64(encoded)
        .map_err(|e| ApiError::from(ScreeningError::from(e)))?;

    let response = screen(&state, source).await?;
    Ok(Json(response))
}

/// Run one prediction off the async runtime, bounded by the configured timeout
pub(crate) async fn screen(
    state: &AppState,
    source: ImageSource,
) -> Result<PredictResponse, ApiError> {
    let started = Instant::now();
    let engine = state.engine.clone();
    let task = tokio::task::spawn_blocking(move || engine.predict(&source));

    let outcome = match tokio::time::timeout(state.config.prediction_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(ScreeningError::Prediction(format!(
            "prediction task failed: {}",
            join_error
        ))),
        Err(_) => {
            state.metrics.record(OUTCOME_TIMEOUT, started.elapsed());
            warn!(
                "Prediction exceeded {:?} timeout",
                state.config.prediction_timeout
            );
            return Err(ApiError::Timeout);
        }
    };

    let elapsed = started.elapsed();

    match outcome {
        Ok(verdict) => {
            state.metrics.record(verdict.status.as_str(), elapsed);
            info!(
                "Screening complete: {} (anemia={:.4}, {}ms)",
                verdict.status,
                verdict.confidence.anemia,
                elapsed.as_millis()
            );
            Ok(PredictResponse::from_verdict(
                verdict,
                elapsed.as_millis() as u64,
            ))
        }
        Err(e) => {
            state.metrics.record(e.kind(), elapsed);
            if e.is_client_error() {
                warn!("Screening rejected input: {}", e);
            } else {
                error!("Screening failed: {}", e);
            }
            Err(e.into())
        }
    }
}
