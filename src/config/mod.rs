// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Service configuration
//!
//! Layered in this order (later wins):
//! 1. Built-in defaults (all-MiniLM-L6-v2 on 0.0.0.0:8003)
//! 2. Optional TOML file with `[server]` and `[model]` tables
//! 3. Command-line flags, each with an environment variable fallback

pub mod args;

pub use args::Args;

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default Hugging Face repository for the embedding model
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Output dimension of all-MiniLM-L6-v2
pub const DEFAULT_DIMENSION: usize = 384;

/// Upper bound on token sequence length (BERT position embeddings)
pub const MAX_SEQ_LENGTH_LIMIT: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8003,
        }
    }
}

impl ServerConfig {
    /// Resolves `host:port` into a bindable socket address
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                field: "server.host",
                message: format!("'{}:{}' is not a socket address ({})", self.host, self.port, e),
            })
    }
}

/// Where the embedding model comes from and how it runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Hugging Face repository id, also used as the model's display name
    pub repo: String,
    /// Git revision of the repository (branch, tag or commit)
    pub revision: String,
    /// ONNX file path, relative to the repository or `model_dir`
    pub onnx_file: String,
    /// Tokenizer file path, relative to the repository or `model_dir`
    pub tokenizer_file: String,
    /// Local directory holding the model files; skips the Hub when set
    pub model_dir: Option<PathBuf>,
    /// Hub cache directory (defaults to the hf-hub cache location)
    pub cache_dir: Option<PathBuf>,
    pub max_seq_length: usize,
    pub intra_threads: usize,
    pub dimension: usize,
    pub normalize: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            repo: DEFAULT_MODEL_REPO.to_string(),
            revision: "main".to_string(),
            onnx_file: "onnx/model.onnx".to_string(),
            tokenizer_file: "tokenizer.json".to_string(),
            model_dir: None,
            cache_dir: None,
            max_seq_length: 256,
            intra_threads: 4,
            dimension: DEFAULT_DIMENSION,
            normalize: true,
        }
    }
}

impl ModelConfig {
    /// Short model name, e.g. "all-MiniLM-L6-v2"
    pub fn short_name(&self) -> &str {
        self.repo.rsplit('/').next().unwrap_or(&self.repo)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    ///
    /// Missing tables and keys fall back to their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Builds the effective configuration from parsed flags
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        args.apply(&mut config);
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                field: "server.port",
                message: "port must be non-zero".to_string(),
            });
        }
        self.server.socket_addr()?;

        let model = &self.model;
        if model.repo.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "model.repo",
                message: "repository id cannot be empty".to_string(),
            });
        }
        if model.max_seq_length == 0 || model.max_seq_length > MAX_SEQ_LENGTH_LIMIT {
            return Err(ConfigError::Invalid {
                field: "model.max_seq_length",
                message: format!(
                    "must be between 1 and {} (got {})",
                    MAX_SEQ_LENGTH_LIMIT, model.max_seq_length
                ),
            });
        }
        if model.intra_threads == 0 {
            return Err(ConfigError::Invalid {
                field: "model.intra_threads",
                message: "at least one thread is required".to_string(),
            });
        }
        if model.dimension == 0 {
            return Err(ConfigError::Invalid {
                field: "model.dimension",
                message: "dimension must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
