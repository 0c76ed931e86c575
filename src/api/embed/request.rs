// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedRequest type for POST /embed
//!
//! The body is parsed by hand instead of through `axum::Json` so that every
//! malformed input maps to a 400 with a plain `{"error": ...}` body.

use crate::api::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MISSING_TEXT_MESSAGE: &str = "Missing 'text' field";
pub const INVALID_TEXT_MESSAGE: &str = "Text must be non-empty string";

/// Request body for POST /embed
///
/// # Example
/// ```json
/// {"text": "Hello world"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedRequest {
    /// Text to embed, passed to the model as given (not trimmed)
    pub text: String,
}

impl EmbedRequest {
    /// Parses and validates a raw request body
    ///
    /// # Validation Rules
    /// 1. Body must be valid JSON
    /// 2. Body must be a non-empty object with a `text` key
    /// 3. `text` must be a string that is not empty or whitespace-only
    ///
    /// Unknown fields are ignored.
    pub fn from_slice(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid JSON body: {}", e)))?;

        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        let text = match value {
            Value::Object(mut map) => map
                .remove("text")
                .ok_or_else(|| ApiError::InvalidRequest(MISSING_TEXT_MESSAGE.to_string()))?,
            _ => return Err(ApiError::InvalidRequest(MISSING_TEXT_MESSAGE.to_string())),
        };

        match text {
            Value::String(text) if !text.trim().is_empty() => Ok(Self { text }),
            _ => Err(ApiError::InvalidRequest(INVALID_TEXT_MESSAGE.to_string())),
        }
    }
}
