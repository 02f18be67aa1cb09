//! # a2a-protocol
//!
//! Wire vocabulary for talking to remote agents over the agent-to-agent (A2A)
//! protocol: JSON-RPC 2.0 requests sent over HTTP, answered with a
//! `text/event-stream` body whose events each carry one JSON-RPC response.
//!
//! This crate does no I/O. It provides:
//!
//! - **Types**: agent cards, messages, parts and task lifecycle events
//! - **JSON-RPC**: the `message/stream` request envelope and a tolerant
//!   decoder for streamed responses
//! - **SSE**: an incremental `text/event-stream` decoder
//!
//! ## Quick Start
//!
//! ```rust
//! use a2a_protocol::{SseDecoder, StreamResponse, StreamingResult};
//!
//! let mut decoder = SseDecoder::new();
//! let body = b"data: {\"result\":{\"kind\":\"status-update\",\"status\":{\"state\":\"working\"},\"final\":true}}\n\n";
//!
//! for event in decoder.push(body).unwrap() {
//!     let frame = StreamResponse::from_json(&event.data).unwrap();
//!     assert!(matches!(
//!         frame,
//!         StreamResponse::Result { result: Some(StreamingResult::StatusUpdate(_)), .. }
//!     ));
//! }
//! ```

mod error;
pub mod jsonrpc;
pub mod sse;
pub mod types;

pub use error::{ProtocolError, Result};
pub use jsonrpc::{
    JsonRpcError, SendStreamingMessageRequest, StreamResponse, StreamingResult, JSONRPC_VERSION,
    METHOD_MESSAGE_STREAM,
};
pub use sse::{MAX_LINE_BYTES, SseDecoder, SseEvent};
pub use types::{
    AgentCapabilities, AgentCard, AgentSkill, Artifact, Message, MessageSendConfiguration,
    MessageSendParams, Part, Role, Task, TaskArtifactUpdateEvent, TaskState, TaskStatus,
    TaskStatusUpdateEvent,
};

/// Well-known path, relative to an agent's base URL, of its agent card.
pub const AGENT_CARD_PATH: &str = "/.well-known/agent.json";
