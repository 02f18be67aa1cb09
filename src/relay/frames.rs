//! Mapping of remote frames onto [`StreamEvent`]s.

use crate::types::{Query, StreamEvent};
use a2a_protocol::{
    Message, MessageSendConfiguration, MessageSendParams, SendStreamingMessageRequest,
    StreamResponse, StreamingResult,
};
use serde_json::{Map, Value};

/// Status text used when a running task reports no visible text yet.
pub const PROCESSING_PLACEHOLDER: &str = "Agent is processing...";

/// Output modes the relay can forward to callers.
pub const ACCEPTED_OUTPUT_MODES: [&str; 2] = ["text", "text/plain"];

/// Build the wire request for one query.
///
/// Every call gets a fresh correlation id and message id; the session id
/// travels in the request metadata.
pub fn build_envelope(query: &Query) -> SendStreamingMessageRequest {
    let mut metadata = Map::new();
    metadata.insert(
        "session_id".to_string(),
        Value::String(query.session_id.clone()),
    );

    SendStreamingMessageRequest::new(MessageSendParams {
        message: Message::user_text(query.user_input.as_str()),
        configuration: Some(MessageSendConfiguration {
            accepted_output_modes: ACCEPTED_OUTPUT_MODES.iter().map(|m| m.to_string()).collect(),
            blocking: None,
        }),
        metadata: Some(metadata),
    })
}

/// Classify one remote frame.
///
/// Checks run in a fixed order: protocol error, empty result, final status,
/// non-final status, anything else. Returns `None` only for a textless
/// non-final status when the placeholder is disabled.
pub fn normalize_frame(frame: &StreamResponse, emit_placeholder: bool) -> Option<StreamEvent> {
    let result = match frame {
        StreamResponse::Error { error, .. } => {
            return Some(StreamEvent::error(format!("Agent error: {}", error)));
        }
        StreamResponse::Result { result: None, .. } => {
            return Some(StreamEvent::warning("Empty response from agent"));
        }
        StreamResponse::Result {
            result: Some(result),
            ..
        } => result,
    };

    match result {
        StreamingResult::StatusUpdate(update) if update.is_final => Some(StreamEvent::Complete),
        StreamingResult::StatusUpdate(update) => {
            match update.message().and_then(Message::first_text) {
                Some(text) => Some(StreamEvent::status(text)),
                None if emit_placeholder => Some(StreamEvent::status(PROCESSING_PLACEHOLDER)),
                None => None,
            }
        }
        other => Some(StreamEvent::unknown(format!(
            "Received unknown event: {}",
            other.kind()
        ))),
    }
}
