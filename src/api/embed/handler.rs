// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed HTTP handler

use crate::api::embed::{EmbedRequest, EmbedResponse};
use crate::api::http_server::AppState;
use crate::api::ApiError;
use axum::{body::Bytes, extract::State, Json};
use tracing::{debug, error};

/// POST /embed handler
///
/// Validates the body, then embeds `text` with the shared model.
///
/// # Responses
/// - 200 `{"embedding": [...]}`
/// - 400 `{"error": ...}` for an invalid body; the model is not called
/// - 500 `{"error": ...}` when inference fails
pub async fn embed_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<EmbedResponse>, ApiError> {
    let request = EmbedRequest::from_slice(&body).inspect_err(|e| {
        debug!(error = %e, "Rejected /embed request");
    })?;

    let embedding = state.model.embed(&request.text).await.map_err(|e| {
        error!("Error in /embed: {:#}", e);
        ApiError::InternalError(format!("{:#}", e))
    })?;

    debug!(
        dimension = embedding.len(),
        chars = request.text.chars().count(),
        "Generated embedding"
    );

    Ok(Json(EmbedResponse::from(embedding)))
}
