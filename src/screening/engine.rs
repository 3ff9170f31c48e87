// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Screening engine: normalizer + classifier + threshold policy

use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::errors::ScreeningError;
use super::verdict::{Verdict, RAW_SCORE_POLARITY, THRESHOLD};
use crate::vision::{normalize, AnemiaClassifier, ImageSource, ScoringFunction};

/// Readiness snapshot reported by `/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub ready: bool,
    pub path: String,
    pub load_time_secs: Option<f64>,
    pub error: Option<String>,
}

/// Process-wide screening handle, fixed at startup
///
/// Readiness is a variant rather than a flag: an engine built without a
/// classifier stays `Unavailable` and every prediction reports
/// `ScreeningError::ModelUnavailable`.
#[derive(Clone)]
pub enum ScreeningEngine {
    Ready {
        scorer: Arc<dyn ScoringFunction>,
        model_path: PathBuf,
        load_time: Duration,
    },
    Unavailable {
        model_path: PathBuf,
        reason: String,
    },
}

impl std::fmt::Debug for ScreeningEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreeningEngine::Ready {
                model_path,
                load_time,
                ..
            } => f
                .debug_struct("Ready")
                .field("model_path", model_path)
                .field("load_time", load_time)
                .finish_non_exhaustive(),
            ScreeningEngine::Unavailable { model_path, reason } => f
                .debug_struct("Unavailable")
                .field("model_path", model_path)
                .field("reason", reason)
                .finish(),
        }
    }
}

impl ScreeningEngine {
    /// Load the classifier from `model_path`
    ///
    /// Never fails: a load error is logged and yields the `Unavailable` variant.
    pub async fn load<P: AsRef<Path>>(model_path: P) -> Self {
        let model_path = model_path.as_ref();
        match AnemiaClassifier::new(model_path).await {
            Ok(classifier) => {
                let load_time = classifier.load_time();
                info!("✅ Screening engine ready ({})", model_path.display());
                Self::Ready {
                    scorer: Arc::new(classifier),
                    model_path: model_path.to_path_buf(),
                    load_time,
                }
            }
            Err(e) => {
                warn!(
                    "⚠️ Failed to load classifier from {}: {:#}",
                    model_path.display(),
                    e
                );
                Self::unavailable(model_path, format!("{:#}", e))
            }
        }
    }

    /// Build a ready engine around an already loaded scorer
    pub fn with_scorer(scorer: Arc<dyn ScoringFunction>, model_path: impl Into<PathBuf>) -> Self {
        Self::Ready {
            scorer,
            model_path: model_path.into(),
            load_time: Duration::ZERO,
        }
    }

    pub fn unavailable(model_path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            model_path: model_path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ScreeningEngine::Ready { .. })
    }

    pub fn status(&self) -> ModelStatus {
        match self {
            ScreeningEngine::Ready {
                model_path,
                load_time,
                ..
            } => ModelStatus {
                ready: true,
                path: model_path.display().to_string(),
                load_time_secs: Some(load_time.as_secs_f64()),
                error: None,
            },
            ScreeningEngine::Unavailable { model_path, reason } => ModelStatus {
                ready: false,
                path: model_path.display().to_string(),
                load_time_secs: None,
                error: Some(reason.clone()),
            },
        }
    }

    /// Screen one image
    ///
    /// 1. Check the classifier is loaded
    /// 2. Decode and normalize the image
    /// 3. Score it (a panic inside the scorer is reported, not propagated)
    /// 4. Apply the polarity and threshold policy
    pub fn predict(&self, source: &ImageSource) -> Result<Verdict, ScreeningError> {
        let scorer = match self {
            ScreeningEngine::Ready { scorer, .. } => scorer,
            ScreeningEngine::Unavailable { reason, .. } => {
                return Err(ScreeningError::ModelUnavailable(reason.clone()));
            }
        };

        let tensor = normalize(source)?;

        let raw_score = panic::catch_unwind(AssertUnwindSafe(|| scorer.score(&tensor)))
            .map_err(|payload| {
                ScreeningError::Prediction(format!(
                    "classifier panicked: {}",
                    panic_message(payload.as_ref())
                ))
            })?
            .map_err(|e| ScreeningError::Prediction(format!("{:#}", e)))?;

        if !raw_score.is_finite() || !(0.0..=1.0).contains(&raw_score) {
            return Err(ScreeningError::Prediction(format!(
                "classifier returned unusable score {}",
                raw_score
            )));
        }

        let verdict = Verdict::from_raw_score(raw_score as f64);

        debug!(
            raw_score = raw_score,
            anemia_score = verdict.confidence.anemia,
            threshold = THRESHOLD,
            polarity = ?RAW_SCORE_POLARITY,
            "Classifier scored image"
        );
        debug!(
            "Verdict: {} ({:.4} vs threshold {})",
            verdict.status, verdict.confidence.anemia, THRESHOLD
        );

        Ok(verdict)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
