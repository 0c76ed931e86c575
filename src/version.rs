// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the sentence embedding node

/// Semantic version number, taken from Cargo.toml
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "all-minilm-l6-v2",
    "onnx-runtime",
    "hf-hub-download",
    "mean-pooling",
    "l2-normalization",
    "graceful-shutdown",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Sentence Embed Node v{}", VERSION_NUMBER)
}

/// Feature list as one comma-separated line for the startup log
pub fn get_features_string() -> String {
    FEATURES.join(", ")
}
