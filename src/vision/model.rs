// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX wrapper for the pretrained anemia classifier
//!
//! The classifier is a MobileNetV3 binary model exported from Keras to ONNX.
//! Its single sigmoid output is P(non-anemia); interpreting that output is the
//! decision engine's job, this module only produces the raw scalar.

use anyhow::{Context, Result};
use ndarray::Array4;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::preprocessing::NormalizedTensor;

/// Opaque scoring capability consumed by the decision engine
///
/// Implementations map one normalized image tensor to exactly one raw score.
/// They must be safe to call from several request tasks at once.
pub trait ScoringFunction: Send + Sync {
    fn score(&self, input: &NormalizedTensor) -> Result<f32>;
}

/// ONNX Runtime session running the anemia classifier on CPU
#[derive(Clone)]
pub struct AnemiaClassifier {
    /// ONNX Runtime session; `run` needs exclusive access so calls are serialized
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Model file the session was built from
    model_path: PathBuf,
    /// Time spent building and validating the session
    load_time: Duration,
}

impl std::fmt::Debug for AnemiaClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnemiaClassifier")
            .field("input_name", &self.input_name)
            .field("model_path", &self.model_path)
            .field("load_time", &self.load_time)
            .finish_non_exhaustive()
    }
}

impl AnemiaClassifier {
    /// Load the classifier from an ONNX file
    ///
    /// A validation pass runs a blank tensor through the model and checks that
    /// it returns a single scalar.
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    /// - The model does not produce exactly one score per image
    pub async fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let started = Instant::now();

        if !model_path.exists() {
            anyhow::bail!("Classifier model not found: {}", model_path.display());
        }

        info!("Loading anemia classifier from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load classifier model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "input_1".to_string());

        debug!("Classifier loaded - input: {}", input_name);

        let classifier = Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            model_path: model_path.to_path_buf(),
            load_time: Duration::ZERO,
        };

        let blank = Array4::<f32>::zeros(NormalizedTensor::SHAPE);
        let warmup_score = classifier
            .run(&blank)
            .context("Classifier validation inference failed")?;
        debug!("Classifier validation score: {:.4}", warmup_score);

        let load_time = started.elapsed();
        info!(
            "✅ Anemia classifier ready (CPU-only, {:.2}s)",
            load_time.as_secs_f64()
        );

        Ok(Self {
            load_time,
            ..classifier
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn load_time(&self) -> Duration {
        self.load_time
    }

    fn run(&self, input: &Array4<f32>) -> Result<f32> {
        let shape = input.shape();
        if shape != NormalizedTensor::SHAPE {
            anyhow::bail!(
                "Invalid input shape: {:?}, expected {:?}",
                shape,
                NormalizedTensor::SHAPE
            );
        }

        let mut session = lock_session(&self.session);

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Classifier inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        if output.len() != 1 {
            anyhow::bail!(
                "Classifier returned {} values (shape {:?}), expected a single score",
                output.len(),
                output.shape()
            );
        }

        output
            .iter()
            .next()
            .copied()
            .context("Classifier returned an empty output")
    }
}

/// Lock the session, recovering it if an earlier `run` unwound while holding it.
/// The session carries no Rust-side state an unwound `run` can leave half-written.
fn lock_session<T>(session: &Mutex<T>) -> MutexGuard<'_, T> {
    session.lock().unwrap_or_else(|poisoned| {
        warn!("Classifier session lock was poisoned by a panicked inference, recovering");
        session.clear_poison();
        poisoned.into_inner()
    })
}

impl ScoringFunction for AnemiaClassifier {
    fn score(&self, input: &NormalizedTensor) -> Result<f32> {
        self.run(input.as_array())
    }
}
