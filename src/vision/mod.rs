// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image handling for conjunctival screening
//!
//! This module provides:
//! - Decode-boundary validation of uploaded images
//! - Normalization into the classifier's input tensor
//! - The ONNX classifier behind the `ScoringFunction` seam
//!
//! Inference runs on CPU only.

pub mod image_utils;
pub mod model;
pub mod preprocessing;

pub use image_utils::{decode_image_bytes, detect_format, ImageError, ImageInfo, ImageSource};
pub use model::{AnemiaClassifier, ScoringFunction};
pub use preprocessing::{normalize, normalize_image, NormalizedTensor, INPUT_SIZE};
