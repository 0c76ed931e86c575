// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use super::ServiceConfig;
use clap::Parser;
use std::path::PathBuf;

/// Sentence embedding node
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "sentence-embed-node")]
#[command(version)]
#[command(about = "Serves all-MiniLM-L6-v2 sentence embeddings over HTTP", long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(long, env = "EMBED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "EMBED_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "EMBED_PORT")]
    pub port: Option<u16>,

    /// Hugging Face repository of the model
    #[arg(long, env = "EMBED_MODEL_REPO")]
    pub model_repo: Option<String>,

    #[arg(long, env = "EMBED_MODEL_REVISION")]
    pub model_revision: Option<String>,

    /// Local directory with the ONNX model and tokenizer (skips the Hub)
    #[arg(long, env = "EMBED_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Hub download cache, used as-is (defaults to `$HF_HOME/hub`)
    #[arg(long, env = "EMBED_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    #[arg(long, env = "EMBED_MAX_SEQ_LENGTH")]
    pub max_seq_length: Option<usize>,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "EMBED_INTRA_THREADS")]
    pub intra_threads: Option<usize>,
}

impl Args {
    /// Overrides `config` with every flag that was given
    pub fn apply(&self, config: &mut ServiceConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(repo) = &self.model_repo {
            config.model.repo = repo.clone();
        }
        if let Some(revision) = &self.model_revision {
            config.model.revision = revision.clone();
        }
        if let Some(dir) = &self.model_dir {
            config.model.model_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.cache_dir {
            config.model.cache_dir = Some(dir.clone());
        }
        if let Some(len) = self.max_seq_length {
            config.model.max_seq_length = len;
        }
        if let Some(threads) = self.intra_threads {
            config.model.intra_threads = threads;
        }
    }
}
