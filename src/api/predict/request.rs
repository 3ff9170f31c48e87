// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Multipart field carrying the uploaded image
pub const UPLOAD_FIELD: &str = "file";

/// JSON prediction request with a base64-encoded image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    /// Base64-encoded image data
    #[serde(default)]
    pub image: Option<String>,
}

impl PredictRequest {
    /// Validate the request against the configured upload limit
    pub fn validate(&self, max_file_size: usize) -> Result<(), ApiError> {
        let image = match self.image.as_deref() {
            Some(image) if !image.is_empty() => image,
            _ => {
                return Err(ApiError::ValidationError {
                    field: "image".to_string(),
                    message: "image is required".to_string(),
                })
            }
        };

        // base64 inflates payloads by 4/3
        let decoded_estimate = image.len() / 4 * 3;
        if decoded_estimate > max_file_size {
            return Err(ApiError::PayloadTooLarge {
                size: Some(decoded_estimate),
                max: max_file_size,
            });
        }

        Ok(())
    }
}
