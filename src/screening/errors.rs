// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

use crate::vision::ImageError;

/// Every failure the screening engine can report
#[derive(Debug, Error)]
pub enum ScreeningError {
    /// Input could not be read as a raster image. Caller error, never retried.
    #[error("Invalid image: {0}")]
    ImageDecode(#[from] ImageError),

    /// Classifier was never loaded. Persists until the process restarts.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Classifier was invoked but failed or returned an unusable score
    #[error("Prediction failed: {0}")]
    Prediction(String),
}

impl ScreeningError {
    /// Stable identifier, used for metrics labels and error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            ScreeningError::ImageDecode(_) => "image_decode_error",
            ScreeningError::ModelUnavailable(_) => "model_unavailable",
            ScreeningError::Prediction(_) => "prediction_error",
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, ScreeningError::ImageDecode(_))
    }
}
