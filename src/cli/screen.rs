// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::api::PredictResponse;
use crate::config::ScreeningConfig;
use crate::screening::{ScreeningEngine, Verdict, DISCLAIMER};
use crate::vision::ImageSource;

/// A bundled sample image, relative to the sample root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub name: &'static str,
    pub relative_path: &'static str,
}

/// Fixed sample set: one anemia case, two non-anemia cases
pub const SAMPLES: [Sample; 3] = [
    Sample {
        name: "anemia",
        relative_path: "anemia/15.jpg",
    },
    Sample {
        name: "non-anemia",
        relative_path: "non-anemia/16.jpg",
    },
    Sample {
        name: "non-anemia",
        relative_path: "non-anemia/44.jpg",
    },
];

/// Arguments for the screen command
#[derive(Args, Debug)]
pub struct ScreenArgs {
    /// Path to a conjunctiva photograph
    #[arg(long, conflicts_with = "sample", required_unless_present = "sample")]
    pub image: Option<PathBuf>,

    /// Screen one of the bundled samples (1-3, see `samples`)
    #[arg(long, conflicts_with = "image")]
    pub sample: Option<usize>,

    /// ONNX model path (overrides MODEL_PATH)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Sample root directory (overrides SAMPLE_DIR)
    #[arg(long)]
    pub sample_dir: Option<PathBuf>,

    /// Print the verdict as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the samples command
#[derive(Args, Debug)]
pub struct SamplesArgs {
    /// Sample root directory (overrides SAMPLE_DIR)
    #[arg(long)]
    pub sample_dir: Option<PathBuf>,
}

/// Resolve a 1-based sample number to a path under `sample_dir`
pub fn sample_path(sample_dir: &Path, number: usize) -> Result<PathBuf> {
    let sample = number
        .checked_sub(1)
        .and_then(|index| SAMPLES.get(index))
        .ok_or_else(|| anyhow!("Unknown sample {} (choose 1-{})", number, SAMPLES.len()))?;
    Ok(sample_dir.join(sample.relative_path))
}

/// One line per sample, marking files missing from `sample_dir`
pub fn list_samples(sample_dir: &Path) -> Vec<String> {
    SAMPLES
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let path = sample_dir.join(sample.relative_path);
            let marker = if path.exists() { "" } else { " (missing)" };
            format!("{}. [{}] {}{}", i + 1, sample.name, path.display(), marker)
        })
        .collect()
}

/// Strip the advice markup for terminal output
pub fn plain_text(html: &str) -> String {
    let spaced = html.replace("</p>", "</p>\n");
    ammonia::Builder::empty()
        .clean(&spaced)
        .to_string()
        .trim()
        .to_string()
}

pub fn render_verdict(verdict: &Verdict) -> String {
    format!(
        "{}\n\n{}\n\nConfidence:\n  anemia:     {:.2}%\n  non-anemia: {:.2}%\n\n{}",
        verdict.label(),
        plain_text(&verdict.advice),
        verdict.confidence.anemia * 100.0,
        verdict.confidence.non_anemia * 100.0,
        DISCLAIMER
    )
}

/// Same JSON body `/predict` returns
pub fn verdict_json(verdict: &Verdict, elapsed: Duration) -> Result<String> {
    let response = PredictResponse::from_verdict(verdict.clone(), elapsed.as_millis() as u64);
    Ok(serde_json::to_string_pretty(&response)?)
}

/// Read `path` and screen it with `engine`
pub fn screen_file(
    engine: &ScreeningEngine,
    path: &Path,
    max_file_size: usize,
) -> Result<Verdict> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if bytes.len() > max_file_size {
        bail!(
            "{} is {} bytes, larger than the {} byte limit",
            path.display(),
            bytes.len(),
            max_file_size
        );
    }
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    Ok(engine.predict(&ImageSource::Encoded(bytes))?)
}

pub async fn run_screen(args: ScreenArgs) -> Result<()> {
    let mut config = ScreeningConfig::from_env()?;
    if let Some(model) = args.model {
        config.model_path = model;
    }
    if let Some(sample_dir) = args.sample_dir {
        config.sample_dir = sample_dir;
    }

    let image_path = match (args.image, args.sample) {
        (Some(path), _) => path,
        (None, Some(number)) => sample_path(&config.sample_dir, number)?,
        (None, None) => bail!("Either --image or --sample is required"),
    };

    let engine = ScreeningEngine::load(&config.model_path).await;
    if !engine.is_ready() {
        let reason = engine.status().error.unwrap_or_default();
        bail!("Model not loaded from {}: {}", config.model_path.display(), reason);
    }

    info!("Screening {}", image_path.display());
    let started = Instant::now();
    let verdict = screen_file(&engine, &image_path, config.max_file_size)?;

    if args.json {
        println!("{}", verdict_json(&verdict, started.elapsed())?);
    } else {
        println!("{}", render_verdict(&verdict));
    }

    Ok(())
}

pub async fn run_samples(args: SamplesArgs) -> Result<()> {
    let mut config = ScreeningConfig::from_env()?;
    if let Some(sample_dir) = args.sample_dir {
        config.sample_dir = sample_dir;
    }

    println!("Samples in {}:", config.sample_dir.display());
    for line in list_samples(&config.sample_dir) {
        println!("  {}", line);
    }
    Ok(())
}
