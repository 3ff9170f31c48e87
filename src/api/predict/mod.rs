// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Screening prediction endpoints
//!
//! - `POST /predict` multipart upload (`file` field)
//! - `POST /v1/predict` JSON body `{"image": "<base64>"}`

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{predict_base64_handler, predict_upload_handler};
pub use request::{PredictRequest, UPLOAD_FIELD};
pub use response::PredictResponse;
