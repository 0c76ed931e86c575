// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Locating the ONNX model and tokenizer on disk
//!
//! Files come either from a local directory (`model.model_dir`) or from the
//! Hugging Face Hub, where they are downloaded once into the hf-hub cache.

use crate::config::ModelConfig;
use anyhow::{Context, Result};
use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Cache, Repo, RepoType};
use std::path::{Path, PathBuf};
use tracing::info;

/// Paths of the two files an [`OnnxEmbeddingModel`](super::OnnxEmbeddingModel) needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
}

impl ModelFiles {
    /// Resolves model files for `config`, downloading them if needed
    ///
    /// Blocking: the Hub client performs synchronous HTTP.
    pub fn resolve(config: &ModelConfig) -> Result<Self> {
        match &config.model_dir {
            Some(dir) => Self::from_dir(dir, &config.onnx_file, &config.tokenizer_file),
            None => Self::from_hub(config),
        }
    }

    /// Uses files already present under `dir`
    pub fn from_dir(dir: &Path, onnx_file: &str, tokenizer_file: &str) -> Result<Self> {
        let model_path = dir.join(onnx_file);
        let tokenizer_path = dir.join(tokenizer_file);

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        Ok(Self {
            model_path,
            tokenizer_path,
        })
    }

    /// Directory holding hf-hub's `models--*` entries
    ///
    /// `model.cache_dir` when set, otherwise hf-hub's own default
    /// (`$HF_HOME/hub`, or `~/.cache/huggingface/hub`).
    pub fn hub_cache_dir(config: &ModelConfig) -> PathBuf {
        config
            .cache_dir
            .clone()
            .unwrap_or_else(|| Cache::default().path().clone())
    }

    fn from_hub(config: &ModelConfig) -> Result<Self> {
        let cache_dir = Self::hub_cache_dir(config);
        let api = ApiBuilder::new()
            .with_progress(false)
            .with_cache_dir(cache_dir.clone())
            .build()
            .context("Failed to initialize Hugging Face Hub client")?;

        let repo = api.repo(Repo::with_revision(
            config.repo.clone(),
            RepoType::Model,
            config.revision.clone(),
        ));

        info!(
            repo = %config.repo,
            revision = %config.revision,
            cache_dir = %cache_dir.display(),
            "Fetching model files from Hugging Face Hub"
        );

        let model_path = repo.get(&config.onnx_file).with_context(|| {
            format!("Failed to download {} from {}", config.onnx_file, config.repo)
        })?;
        let tokenizer_path = repo.get(&config.tokenizer_file).with_context(|| {
            format!(
                "Failed to download {} from {}",
                config.tokenizer_file, config.repo
            )
        })?;

        Ok(Self {
            model_path,
            tokenizer_path,
        })
    }
}
