// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deployment configuration
//!
//! The decision constants (threshold, input size, polarity) are fixed in code.
//! Everything here is plumbing: where the model lives, where to listen, what
//! uploads to accept and how long a prediction may take.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::screening::{ScorePolarity, RAW_SCORE_POLARITY, THRESHOLD};
use crate::vision::image_utils::{ALLOWED_EXTENSIONS, MAX_IMAGE_SIZE};
use crate::vision::INPUT_SIZE;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL_PATH: &str = "./models/anemia_model.onnx";
pub const DEFAULT_SAMPLE_DIR: &str = "./dataset/test";
pub const DEFAULT_PREDICTION_TIMEOUT_SECS: u64 = 30;

/// Classifier output classes in index order
pub const CLASS_NAMES: [&str; 2] = ["anemia", "non-anemia"];

#[derive(Debug, Clone)]
pub struct ScreeningConfig {
    pub host: String,
    pub port: u16,
    /// ONNX export of the classifier
    pub model_path: PathBuf,
    /// Allowed CORS origins, `*` allows any
    pub cors_origins: Vec<String>,
    /// Maximum upload size in bytes
    pub max_file_size: usize,
    pub prediction_timeout: Duration,
    /// Root of the bundled sample images
    pub sample_dir: PathBuf,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            cors_origins: vec!["*".to_string()],
            max_file_size: MAX_IMAGE_SIZE,
            prediction_timeout: Duration::from_secs(DEFAULT_PREDICTION_TIMEOUT_SECS),
            sample_dir: PathBuf::from(DEFAULT_SAMPLE_DIR),
        }
    }
}

impl ScreeningConfig {
    /// Read configuration from the process environment (after loading `.env`)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Recognised keys: `API_HOST`, `API_PORT`, `RENDER` + `PORT`, `MODEL_PATH`,
    /// `CORS_ORIGINS`, `MAX_FILE_SIZE`, `PREDICTION_TIMEOUT`, `SAMPLE_DIR`.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let mut host = lookup("API_HOST").unwrap_or(defaults.host);
        let mut port = match lookup("API_PORT") {
            Some(v) => v
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("Invalid API_PORT '{}': {}", v, e))?,
            None => defaults.port,
        };

        // Render injects PORT and requires binding on all interfaces
        if lookup("RENDER").is_some() {
            host = DEFAULT_HOST.to_string();
            if let Some(v) = lookup("PORT") {
                port = v
                    .parse::<u16>()
                    .map_err(|e| anyhow::anyhow!("Invalid PORT '{}': {}", v, e))?;
            }
        }

        let model_path = lookup("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_path);

        let cors_origins = match lookup("CORS_ORIGINS") {
            Some(v) => v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_origins,
        };

        let max_file_size = match lookup("MAX_FILE_SIZE") {
            Some(v) => v
                .parse::<usize>()
                .map_err(|e| anyhow::anyhow!("Invalid MAX_FILE_SIZE '{}': {}", v, e))?,
            None => defaults.max_file_size,
        };

        let prediction_timeout = match lookup("PREDICTION_TIMEOUT") {
            Some(v) => Duration::from_secs(
                v.parse::<u64>()
                    .map_err(|e| anyhow::anyhow!("Invalid PREDICTION_TIMEOUT '{}': {}", v, e))?,
            ),
            None => defaults.prediction_timeout,
        };

        let sample_dir = lookup("SAMPLE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.sample_dir);

        Ok(Self {
            host,
            port,
            model_path,
            cors_origins,
            max_file_size,
            prediction_timeout,
            sample_dir,
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {}:{}: {}", self.host, self.port, e))
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }

    /// List configuration problems. An empty list means the config is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.model_path.exists() {
            errors.push(format!(
                "Model file not found: {}",
                self.model_path.display()
            ));
        }

        if self.port == 0 {
            errors.push(format!("Invalid port: {}", self.port));
        }

        if self.max_file_size == 0 || self.max_file_size > MAX_IMAGE_SIZE {
            errors.push(format!(
                "Invalid max file size: {} (must be 1..={})",
                self.max_file_size, MAX_IMAGE_SIZE
            ));
        }

        if self.prediction_timeout.is_zero() {
            errors.push("Invalid prediction timeout: 0s".to_string());
        }

        if !(0.0..=1.0).contains(&THRESHOLD) {
            errors.push(format!("Invalid threshold: {}", THRESHOLD));
        }

        errors
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            model: ModelSummary {
                path: self.model_path.display().to_string(),
                exists: self.model_path.exists(),
                threshold: THRESHOLD,
                image_size: (INPUT_SIZE, INPUT_SIZE),
                classes: CLASS_NAMES.iter().map(|c| c.to_string()).collect(),
                polarity: RAW_SCORE_POLARITY,
            },
            server: ServerSummary {
                host: self.host.clone(),
                port: self.port,
                cors_origins: self.cors_origins.clone(),
            },
            upload: UploadSummary {
                max_file_size: self.max_file_size,
                allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            },
            performance: PerformanceSummary {
                prediction_timeout_secs: self.prediction_timeout.as_secs(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub model: ModelSummary,
    pub server: ServerSummary,
    pub upload: UploadSummary,
    pub performance: PerformanceSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub path: String,
    pub exists: bool,
    pub threshold: f64,
    pub image_size: (u32, u32),
    pub classes: Vec<String>,
    pub polarity: ScorePolarity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSummary {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSummary {
    pub max_file_size: usize,
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub prediction_timeout_secs: u64,
}
