// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod monitoring;
pub mod screening;
pub mod version;
pub mod vision;

// Re-export main types
pub use config::ScreeningConfig;
pub use screening::{ScreeningEngine, ScreeningError, ScreeningStatus, Verdict, THRESHOLD};
pub use vision::{ImageSource, NormalizedTensor, ScoringFunction};
