// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Sentence pooling over token embeddings

use ndarray::ArrayView2;

/// Smallest norm used when normalizing, same as torch's `F.normalize`
const NORM_EPSILON: f32 = 1e-12;

/// Mean pooling over the sequence axis, weighted by the attention mask
///
/// `token_embeddings` is `[seq_len, hidden_dim]`. Padding positions (mask 0)
/// do not contribute. Positions beyond the mask length are ignored.
pub fn mean_pool(token_embeddings: ArrayView2<f32>, attention_mask: &[i64]) -> Vec<f32> {
    let seq_len = token_embeddings.nrows().min(attention_mask.len());
    let hidden_dim = token_embeddings.ncols();

    let mut pooled = vec![0.0f32; hidden_dim];
    let mut sum_mask = 0.0f32;

    for i in 0..seq_len {
        let mask_value = attention_mask[i] as f32;
        if mask_value == 0.0 {
            continue;
        }
        sum_mask += mask_value;
        for (acc, value) in pooled.iter_mut().zip(token_embeddings.row(i)) {
            *acc += value * mask_value;
        }
    }

    // Avoid division by zero for an all-padding sequence
    let denom = sum_mask.max(1e-9);
    for val in &mut pooled {
        *val /= denom;
    }

    pooled
}

/// Scales `vector` to unit L2 norm in place
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm.max(NORM_EPSILON);
    for value in vector.iter_mut() {
        *value /= denom;
    }
}

/// Pools token embeddings into one sentence vector, normalizing when asked
pub fn sentence_embedding(
    token_embeddings: ArrayView2<f32>,
    attention_mask: &[i64],
    normalize: bool,
) -> Vec<f32> {
    let mut embedding = mean_pool(token_embeddings, attention_mask);
    if normalize {
        l2_normalize(&mut embedding);
    }
    embedding
}
