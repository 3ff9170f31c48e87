// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the anemia screening service

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-conjunctival-screening-2025-10-20";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.0.0";

/// Build date
pub const BUILD_DATE: &str = "2025-10-20";

/// Service name reported by banners and the root endpoint
pub const SERVICE_NAME: &str = "Conjunctival Anemia Screening API";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "mobilenetv3-classifier",
    "onnx-cpu-inference",
    "multipart-upload",
    "base64-upload",
    "readiness-endpoint",
    "prometheus-metrics",
    "cli-screening",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("{} ({})", VERSION, BUILD_DATE)
}
