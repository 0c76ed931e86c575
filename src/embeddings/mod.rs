// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Sentence embedding models
//!
//! The HTTP layer only sees [`EmbeddingModel`]. The production implementation
//! is [`OnnxEmbeddingModel`], which runs all-MiniLM-L6-v2 through ONNX Runtime
//! and produces 384-dimensional, L2-normalized vectors.

pub mod files;
pub mod onnx_model;
pub mod pooling;

pub use files::ModelFiles;
pub use onnx_model::OnnxEmbeddingModel;
pub use pooling::{l2_normalize, mean_pool, sentence_embedding};

use anyhow::Result;
use async_trait::async_trait;

/// A loaded, read-only text embedding model
///
/// Implementations must be safe to call from many requests at once; the
/// service holds a single instance behind an `Arc` for the whole process.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embeds one text into a vector of length [`EmbeddingModel::dimension`]
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;
}
