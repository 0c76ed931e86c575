// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! This module provides a wrapper around ONNX Runtime for running
//! the all-MiniLM-L6-v2 sentence transformer model.
//!
//! Features:
//! - Model files from a local directory or the Hugging Face Hub
//! - BERT tokenization with truncation to `max_seq_length`
//! - Mean pooling over token embeddings
//! - L2 normalization, as in the sentence-transformers pipeline
//! - 384-dimensional output vectors

use super::files::ModelFiles;
use super::pooling::sentence_embedding;
use super::EmbeddingModel;
use crate::config::ModelConfig;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ndarray::{Array2, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

const VALIDATION_TEXT: &str = "validation test";

/// ONNX-based embedding model (all-MiniLM-L6-v2)
///
/// # Model Details
/// - Input: Text strings (truncated to `max_seq_length` tokens, 256 by default)
/// - Output: 384-dimensional f32 vectors
/// - Provider: CPU (ONNX Runtime)
///
/// # Thread Safety
/// Cloning is cheap; clones share the same session and tokenizer. The session
/// is behind a mutex because ONNX Runtime needs exclusive access per run.
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
    dimension: usize,
    max_length: usize,
    normalize: bool,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("max_length", &self.max_length)
            .field("normalize", &self.normalize)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Resolves the model files and loads the model off the async runtime
    ///
    /// Downloading and session creation are blocking, so both run on the
    /// blocking thread pool.
    pub async fn load(config: &ModelConfig) -> Result<Self> {
        let config = config.clone();
        tokio::task::spawn_blocking(move || {
            let files = ModelFiles::resolve(&config)?;
            Self::new(config.short_name(), &files, &config)
        })
        .await
        .context("Model loading task failed")?
    }

    /// Creates a new ONNX embedding model from files on disk
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found or invalid
    /// - Tokenizer file not found or invalid
    /// - ONNX Runtime initialization fails
    /// - Model doesn't output `config.dimension` dimensions
    pub fn new(model_name: impl Into<String>, files: &ModelFiles, config: &ModelConfig) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = &files.model_path;
        let tokenizer_path = &files.tokenizer_path;

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        info!(
            model = %model_name,
            path = %model_path.display(),
            intra_threads = config.intra_threads,
            "Initializing ONNX embedding model"
        );

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_seq_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;

        let model = Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            dimension: config.dimension,
            max_length: config.max_seq_length,
            normalize: config.normalize,
        };

        // Validate the output shape with a test inference
        let probe = model
            .embed_blocking(VALIDATION_TEXT)
            .context("Validation inference failed")?;
        debug!(dimension = probe.len(), "Validation inference succeeded");

        info!(model = %model.model_name, dimension = model.dimension, "ONNX embedding model loaded");

        Ok(model)
    }

    /// Generates the embedding for one text on the calling thread
    ///
    /// 1. Tokenize (truncated to `max_length`)
    /// 2. Run ONNX inference, output `[1, seq_len, hidden_dim]`
    /// 3. Attention-masked mean pooling
    /// 4. Optional L2 normalization
    pub fn embed_blocking(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding
            .get_type_ids()
            .iter()
            .map(|&t| t as i64)
            .collect();
        let seq_len = input_ids.len();

        let input_ids_array = Array2::from_shape_vec((1, seq_len), input_ids)
            .context("Failed to create input_ids array")?;
        let attention_mask_array = Array2::from_shape_vec((1, seq_len), attention_mask.clone())
            .context("Failed to create attention_mask array")?;
        let token_type_ids_array = Array2::from_shape_vec((1, seq_len), token_type_ids)
            .context("Failed to create token_type_ids array")?;

        let mut session_guard = self
            .session
            .lock()
            .map_err(|_| anyhow!("ONNX session lock poisoned"))?;
        let outputs = session_guard.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids_array)?,
            "attention_mask" => Value::from_array(attention_mask_array)?,
            "token_type_ids" => Value::from_array(token_type_ids_array)?
        ])?;

        // Output names differ between exports, so take the first one
        let output_array = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let shape = output_array.shape().to_vec();
        if shape.len() != 3 || shape[2] != self.dimension {
            anyhow::bail!(
                "Model outputs unexpected dimensions: {:?} (expected [batch, seq_len, {}])",
                shape,
                self.dimension
            );
        }

        let token_embeddings = output_array
            .index_axis(Axis(0), 0)
            .into_dimensionality::<Ix2>()
            .context("Failed to view token embeddings as a matrix")?;

        let embedding = sentence_embedding(token_embeddings, &attention_mask, self.normalize);

        if embedding.len() != self.dimension {
            anyhow::bail!(
                "Unexpected embedding dimension: {} (expected {})",
                embedding.len(),
                self.dimension
            );
        }

        Ok(embedding)
    }

    /// Counts tokens the model sees for `text`, after truncation
    pub fn count_tokens(&self, text: &str) -> Result<usize> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        Ok(encoding.get_attention_mask().iter().map(|&m| m as usize).sum())
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

#[async_trait]
impl EmbeddingModel for OnnxEmbeddingModel {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = self.clone();
        let text = text.to_owned();

        tokio::task::spawn_blocking(move || model.embed_blocking(&text))
            .await
            .context("Embedding task failed")?
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
