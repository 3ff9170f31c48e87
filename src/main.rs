// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anemia_screen::{
    api::{start_server, AppState},
    config::ScreeningConfig,
    screening::{ScreeningEngine, THRESHOLD},
    version,
};
use anyhow::Result;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting {}...\n", version::SERVICE_NAME);
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();

    let config = ScreeningConfig::from_env()?;

    let problems = config.validate();
    if problems.is_empty() {
        tracing::info!("Configuration OK");
    } else {
        for problem in &problems {
            tracing::warn!("⚠️  Config: {}", problem);
        }
    }

    println!("🧠 Loading classifier from {}...", config.model_path.display());
    let engine = ScreeningEngine::load(&config.model_path).await;
    if engine.is_ready() {
        println!("✅ Classifier loaded (threshold {})", THRESHOLD);
    } else {
        // Keep serving so /health can report the failure
        println!("⚠️  Classifier unavailable, predictions will return 503");
    }

    println!("🌐 API: http://{}:{}", config.host, config.port);
    println!("   POST /predict      multipart upload (field 'file')");
    println!("   POST /v1/predict   JSON {{\"image\": \"<base64>\"}}");
    println!("   GET  /health       readiness");
    println!();

    let state = AppState::new(engine, config)?;
    start_server(state).await?;

    println!("👋 Shutdown complete");
    Ok(())
}
