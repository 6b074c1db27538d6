//! Raw upstream replies.

use serde::{Deserialize, Serialize};

/// A successful upstream reply, before any reshaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamResponse {
    pub status: u16,
    /// Decoded JSON body. Bodies that are not JSON are kept as a string.
    pub body: serde_json::Value,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    /// Decode a raw body, falling back to a JSON string for non-JSON text.
    pub fn from_bytes(status: u16, bytes: &[u8]) -> Self {
        let body = serde_json::from_slice(bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned())
        });
        Self { status, body }
    }
}
