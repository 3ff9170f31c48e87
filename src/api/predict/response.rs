// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction response types

use serde::{Deserialize, Serialize};

use crate::screening::{Confidence, ScreeningStatus, Verdict};

/// Verdict as returned by `/predict` and `/v1/predict`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    /// Human-readable label
    pub label: String,
    /// Advisory text, may contain simple HTML markup
    pub advice: String,
    /// P(anemia) and P(non-anemia)
    pub confidence: Confidence,
    /// Machine-readable status
    pub status: ScreeningStatus,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl PredictResponse {
    pub fn from_verdict(verdict: Verdict, processing_time_ms: u64) -> Self {
        Self {
            label: verdict.label().to_string(),
            advice: verdict.advice,
            confidence: verdict.confidence,
            status: verdict.status,
            processing_time_ms,
        }
    }
}
