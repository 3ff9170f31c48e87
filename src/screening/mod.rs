// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Anemia screening decision layer
//!
//! Turns a conjunctival image into a [`Verdict`]: normalize, score with the
//! classifier, invert the raw score into P(anemia) and compare it against
//! [`THRESHOLD`]. The HTTP API and the CLI both go through
//! [`ScreeningEngine::predict`] so their output is identical.

pub mod engine;
pub mod errors;
pub mod verdict;

pub use engine::{ModelStatus, ScreeningEngine};
pub use errors::ScreeningError;
pub use verdict::{
    Confidence, ScorePolarity, ScreeningStatus, Verdict, DISCLAIMER, RAW_SCORE_POLARITY, THRESHOLD,
};
