// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// src/monitoring/metrics.rs - Prometheus metrics for screening requests

use anyhow::Result;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Outcome label for a prediction that exceeded the configured timeout
pub const OUTCOME_TIMEOUT: &str = "timeout";

/// Latency buckets in seconds; CPU inference of a 224x224 MobileNet lands well under 1s
const DURATION_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Request counters and latency histogram exposed on `/metrics`
#[derive(Clone)]
pub struct ScreeningMetrics {
    registry: Registry,
    requests: IntCounterVec,
    duration: Histogram,
}

impl std::fmt::Debug for ScreeningMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreeningMetrics").finish_non_exhaustive()
    }
}

impl ScreeningMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new(
                "screening_requests_total",
                "Screening requests by outcome",
            ),
            &["outcome"],
        )?;

        let duration = Histogram::with_opts(
            HistogramOpts::new(
                "screening_duration_seconds",
                "Time spent decoding, normalizing and scoring an image",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            registry,
            requests,
            duration,
        })
    }

    /// Count one request with its outcome (a verdict status or an error kind)
    pub fn record(&self, outcome: &str, elapsed: Duration) {
        self.requests.with_label_values(&[outcome]).inc();
        self.duration.observe(elapsed.as_secs_f64());
    }

    pub fn count(&self, outcome: &str) -> u64 {
        self.requests.with_label_values(&[outcome]).get()
    }

    /// Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
