// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod screen;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::ScreeningConfig;

pub use screen::{
    list_samples, plain_text, render_verdict, sample_path, screen_file, verdict_json, Sample,
    SamplesArgs, ScreenArgs, SAMPLES,
};

/// Conjunctival anemia screening CLI
#[derive(Parser, Debug)]
#[command(name = "anemia-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Screen conjunctiva photographs for visual signs of anemia", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Screen an image file or a bundled sample
    Screen(ScreenArgs),

    /// List the bundled sample images
    Samples(SamplesArgs),

    /// Print the effective configuration
    Config,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Screen(args) => screen::run_screen(args).await,
        Commands::Samples(args) => screen::run_samples(args).await,
        Commands::Config => {
            let config = ScreeningConfig::from_env()?;
            for problem in config.validate() {
                eprintln!("⚠️  {}", problem);
            }
            println!("{}", serde_json::to_string_pretty(&config.summary())?);
            Ok(())
        }
    }
}
