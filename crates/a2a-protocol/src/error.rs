//! Error types for a2a-protocol.

use thiserror::Error;

/// Result type for a2a-protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while decoding protocol payloads.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A payload was not valid JSON.
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A payload was valid JSON but not a JSON-RPC response.
    #[error("Not a JSON-RPC response: {0}")]
    NotAResponse(String),

    /// An SSE event carried a non UTF-8 body.
    #[error("Invalid UTF-8 in event stream: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// An event-stream line grew past the decoder's limit without a newline.
    #[error("Event stream line exceeds {0} bytes")]
    LineTooLong(usize),
}
