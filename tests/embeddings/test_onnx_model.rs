// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX model tests against the real all-MiniLM-L6-v2 files
//!
//! These need the model on disk, laid out like the Hugging Face repository
//! (`onnx/model.onnx` and `tokenizer.json`), so they are ignored by default:
//!
//! ```text
//! EMBED_TEST_MODEL_DIR=/path/to/all-MiniLM-L6-v2 cargo test -- --ignored
//! ```

use sentence_embed_node::config::ModelConfig;
use sentence_embed_node::embeddings::{EmbeddingModel, OnnxEmbeddingModel};
use std::path::PathBuf;

const DEFAULT_MODEL_DIR: &str = "./models/all-MiniLM-L6-v2";

fn model_config() -> ModelConfig {
    let dir = std::env::var("EMBED_TEST_MODEL_DIR").unwrap_or_else(|_| DEFAULT_MODEL_DIR.to_string());
    ModelConfig {
        model_dir: Some(PathBuf::from(dir)),
        ..Default::default()
    }
}

async fn load_model() -> OnnxEmbeddingModel {
    OnnxEmbeddingModel::load(&model_config())
        .await
        .expect("Failed to load model")
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (norm_a * norm_b)
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_model_loads_successfully() {
    let model = load_model().await;

    assert_eq!(model.model_name(), "all-MiniLM-L6-v2");
    assert_eq!(model.dimension(), 384);
    assert_eq!(model.max_length(), 256);
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_embed_returns_384_dims() {
    let model = load_model().await;

    let embedding = model.embed("hello").await.expect("Embedding failed");
    assert_eq!(embedding.len(), 384);
    assert!(embedding.iter().all(|v| v.is_finite()));
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_embeddings_are_deterministic() {
    let model = load_model().await;
    let text = "test input for determinism";

    let first = model.embed(text).await.expect("First embedding failed");
    let second = model.embed(text).await.expect("Second embedding failed");

    assert_eq!(first, second);
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_embeddings_are_unit_length() {
    let model = load_model().await;

    for text in ["hello", "The quick brown fox jumps over the lazy dog"] {
        let embedding = model.embed(text).await.unwrap();
        let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "norm of {:?} was {}", text, norm);
    }
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_normalize_disabled_returns_raw_mean() {
    let normalized = load_model().await;
    let raw = OnnxEmbeddingModel::load(&ModelConfig {
        normalize: false,
        ..model_config()
    })
    .await
    .expect("Failed to load model");

    let a = normalized.embed("hello world").await.unwrap();
    let b = raw.embed("hello world").await.unwrap();

    let norm = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() > 1e-2, "raw norm was {}", norm);
    // Same direction, different length
    assert!(cosine_similarity(&a, &b) > 0.9999);
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_similar_sentences_score_higher() {
    let model = load_model().await;

    let cat = model.embed("A cat sits on the mat").await.unwrap();
    let kitten = model.embed("A kitten is resting on a rug").await.unwrap();
    let finance = model.embed("Quarterly revenue grew by ten percent").await.unwrap();

    let close = cosine_similarity(&cat, &kitten);
    let far = cosine_similarity(&cat, &finance);
    assert!(
        close > far,
        "related similarity ({}) should exceed unrelated similarity ({})",
        close,
        far
    );
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_long_text_is_truncated() {
    let model = load_model().await;
    let long_text = "word ".repeat(1000);

    assert_eq!(model.count_tokens(&long_text).unwrap(), 256);

    let embedding = model.embed(&long_text).await.expect("Long text embedding failed");
    assert_eq!(embedding.len(), 384);
    assert!(embedding.iter().all(|v| v.is_finite()));
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_concurrent_embeds_share_one_session() {
    let model = std::sync::Arc::new(load_model().await);
    let expected = model.embed("shared session").await.unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let model = model.clone();
            tokio::spawn(async move { model.embed("shared session").await.unwrap() })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), expected);
    }
}

#[tokio::test]
async fn test_invalid_model_dir_error() {
    let config = ModelConfig {
        model_dir: Some(PathBuf::from("/nonexistent/path/to/model")),
        ..Default::default()
    };

    let error = OnnxEmbeddingModel::load(&config).await.unwrap_err();
    let error_msg = error.to_string();
    assert!(
        error_msg.contains("not found"),
        "Error message should be clear about missing file, got: {}",
        error_msg
    );
}
