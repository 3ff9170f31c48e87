// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Classifier startup tests
//!
//! A missing or corrupt model file must never abort startup; the engine
//! comes up in its unavailable state and reports why.

use anemia_screen::screening::{ScreeningEngine, ScreeningError};
use anemia_screen::vision::{AnemiaClassifier, ImageSource};
use std::io::Write;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_missing_model_file() {
    let result = AnemiaClassifier::new("/nonexistent/models/anemia_model.onnx").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_corrupt_model_leaves_engine_unavailable() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"definitely not an onnx graph").unwrap();

    let engine = ScreeningEngine::load(file.path()).await;
    assert!(!engine.is_ready());

    let status = engine.status();
    assert!(!status.ready);
    assert!(status.error.is_some());
    assert!(status.load_time_secs.is_none());
    assert_eq!(status.path, file.path().display().to_string());

    let err = engine
        .predict(&ImageSource::Encoded(vec![0x89, 0x50, 0x4E, 0x47]))
        .unwrap_err();
    assert!(matches!(err, ScreeningError::ModelUnavailable(_)));
}
