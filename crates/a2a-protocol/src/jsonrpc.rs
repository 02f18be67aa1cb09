//! JSON-RPC 2.0 envelopes for the streaming call and its responses.

use crate::error::{ProtocolError, Result};
use crate::types::{
    Message, MessageSendParams, Task, TaskArtifactUpdateEvent, TaskStatusUpdateEvent,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// JSON-RPC protocol version string.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method name of the streaming send operation.
pub const METHOD_MESSAGE_STREAM: &str = "message/stream";

/// Internal error code used when a remote error carries no code of its own.
pub const INTERNAL_ERROR_CODE: i64 = -32603;

/// A JSON-RPC request carrying `message/stream` parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendStreamingMessageRequest {
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    pub params: MessageSendParams,
}

impl SendStreamingMessageRequest {
    /// Wrap send parameters in a request with a fresh correlation id.
    pub fn new(params: MessageSendParams) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), params)
    }

    /// Wrap send parameters in a request with an explicit correlation id.
    pub fn with_id(id: impl Into<String>, params: MessageSendParams) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.into(),
            method: METHOD_MESSAGE_STREAM.to_string(),
            params,
        }
    }
}

fn internal_error_code() -> i64 {
    INTERNAL_ERROR_CODE
}

/// Error object of a JSON-RPC error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    #[serde(default = "internal_error_code")]
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Interpret whatever a server put in the `error` member.
    ///
    /// Well-formed error objects are kept as is; bare strings and other
    /// shapes become an internal error whose message is the raw value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(message) => Self {
                code: INTERNAL_ERROR_CODE,
                message,
                data: None,
            },
            Value::Object(_) => match serde_json::from_value::<JsonRpcError>(value.clone()) {
                Ok(error) => error,
                Err(_) => Self {
                    code: INTERNAL_ERROR_CODE,
                    message: value.to_string(),
                    data: None,
                },
            },
            other => Self {
                code: INTERNAL_ERROR_CODE,
                message: other.to_string(),
                data: None,
            },
        }
    }
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// The `result` payload of one streaming response, keyed by its `kind`.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamingResult {
    StatusUpdate(TaskStatusUpdateEvent),
    ArtifactUpdate(TaskArtifactUpdateEvent),
    Task(Task),
    Message(Message),
    /// A result whose kind is unknown or whose body did not match its kind.
    Other { kind: String, raw: Value },
}

impl StreamingResult {
    /// Classify a non-null `result` value.
    pub fn from_value(value: Value) -> Self {
        let kind = match value.get("kind").and_then(Value::as_str) {
            Some(kind) => kind.to_string(),
            // Pre-0.2 servers omit the tag on status updates.
            None if value.get("final").is_some() => "status-update".to_string(),
            None => "unrecognized".to_string(),
        };

        let parsed = match kind.as_str() {
            "status-update" => serde_json::from_value(value.clone())
                .map(Self::StatusUpdate)
                .ok()
                .or_else(|| final_notice(&value).map(Self::StatusUpdate)),
            "artifact-update" => serde_json::from_value(value.clone())
                .map(Self::ArtifactUpdate)
                .ok(),
            "task" => serde_json::from_value(value.clone()).map(Self::Task).ok(),
            "message" => serde_json::from_value(value.clone()).map(Self::Message).ok(),
            _ => None,
        };

        parsed.unwrap_or(Self::Other { kind, raw: value })
    }

    /// The wire `kind` this result was classified as.
    pub fn kind(&self) -> &str {
        match self {
            Self::StatusUpdate(_) => "status-update",
            Self::ArtifactUpdate(_) => "artifact-update",
            Self::Task(_) => "task",
            Self::Message(_) => "message",
            Self::Other { kind, .. } => kind,
        }
    }
}

/// Terminal notice for a status update that failed to parse but still
/// carries `final: true`.
fn final_notice(value: &Value) -> Option<TaskStatusUpdateEvent> {
    if value.get("final") != Some(&Value::Bool(true)) {
        return None;
    }
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Some(TaskStatusUpdateEvent {
        task_id: field("taskId"),
        context_id: field("contextId"),
        status: None,
        is_final: true,
        metadata: None,
    })
}

/// One decoded frame of a `message/stream` response.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamResponse {
    /// Protocol-level error frame.
    Error {
        id: Option<String>,
        error: JsonRpcError,
    },
    /// Success frame; `None` when the result was null or missing.
    Result {
        id: Option<String>,
        result: Option<StreamingResult>,
    },
}

impl StreamResponse {
    /// Decode a frame from the JSON text of one SSE `data` field.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Decode a frame from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut object) = value else {
            return Err(ProtocolError::NotAResponse(value.to_string()));
        };

        let id = object.remove("id").and_then(|id| match id {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        if let Some(error) = object.remove("error")
            && !error.is_null()
        {
            return Ok(Self::Error {
                id,
                error: JsonRpcError::from_value(error),
            });
        }

        let result = match object.remove("result") {
            None | Some(Value::Null) => None,
            Some(value) => Some(StreamingResult::from_value(value)),
        };

        Ok(Self::Result { id, result })
    }
}
