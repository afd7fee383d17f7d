//! Common types and utilities shared across models.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Nested sequences (cart items, order items) are stored as JSON documents
/// in TEXT columns. Decoding failures surface as storage errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Malformed stored document: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Helper to parse a JSON array column from the database
pub fn decode_list<T: DeserializeOwned>(json: &str) -> Result<Vec<T>, DocumentError> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(json).map_err(DocumentError::Decode)
}

/// Helper to serialize a list to JSON for the database
pub fn encode_list<T: Serialize>(items: &[T]) -> Result<String, DocumentError> {
    serde_json::to_string(items).map_err(DocumentError::Encode)
}

/// Generic `{ "message": ... }` acknowledgement body
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Treat empty and whitespace-only strings the same as a missing field
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
