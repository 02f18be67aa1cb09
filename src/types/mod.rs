use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============= API Request/Response Types =============

/// Inbound request body of `POST /stream-query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub user_input: String,
    pub session_id: String,
}

/// One user request travelling through the relay.
///
/// The session id is forwarded untouched so the remote agent can keep its own
/// per-session state; the relay itself holds none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub user_input: String,
    pub session_id: String,
}

impl Query {
    pub fn new(user_input: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            session_id: session_id.into(),
        }
    }
}

impl From<QueryRequest> for Query {
    fn from(request: QueryRequest) -> Self {
        Self {
            user_input: request.user_input,
            session_id: request.session_id,
        }
    }
}

// ============= Stream Events =============

/// Normalized event emitted to the caller, serialized as `{"type": ..., "text": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Incremental partial answer.
    Status { text: String },
    /// Terminal: the remote task finished normally.
    Complete,
    /// Terminal when raised by the relay; non-terminal when forwarded from a
    /// remote protocol error frame.
    Error {
        #[serde(rename = "text")]
        message: String,
    },
    /// Non-terminal anomaly such as an empty frame.
    Warning { text: String },
    /// A remote frame shape the relay does not interpret.
    Unknown {
        #[serde(rename = "text")]
        raw: String,
    },
}

impl StreamEvent {
    pub fn status(text: impl Into<String>) -> Self {
        Self::Status { text: text.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::Warning { text: text.into() }
    }

    pub fn unknown(raw: impl Into<String>) -> Self {
        Self::Unknown { raw: raw.into() }
    }

    /// The `type` tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Complete => "complete",
            Self::Error { .. } => "error",
            Self::Warning { .. } => "warning",
            Self::Unknown { .. } => "unknown",
        }
    }
}

// ============= Agent Types =============

/// Registered remote agent, keyed by `name`. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub name: String,
    pub description: String,
    /// URL the agent was registered from; used for all outbound calls.
    pub endpoint_url: String,
}

/// Candidate entry handed to the selector and returned by `GET /agents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub name: String,
    pub description: String,
    pub url: String,
}

impl From<&AgentDescriptor> for AgentSummary {
    fn from(descriptor: &AgentDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            url: descriptor.endpoint_url.clone(),
        }
    }
}

/// Registry listing entry with bookkeeping, as served by `GET /agents`.
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    #[serde(flatten)]
    pub summary: AgentSummary,
    pub streaming: bool,
    pub registered_at: DateTime<Utc>,
}

// ============= Error Types =============

/// Why an endpoint could not be registered. Recovered locally by the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("agent at {url} is unreachable: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("agent at {url} returned a malformed descriptor: {reason}")]
    MalformedDescriptor { url: String, reason: String },

    #[error("agent name '{name}' is already registered from {existing_url}")]
    DuplicateName { name: String, existing_url: String },
}

/// Failures while opening or consuming a remote streaming call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("remote returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("stream interrupted: {0}")]
    Stream(String),

    #[error("undecodable frame: {0}")]
    Decode(String),

    #[error("timed out: {0}")]
    Timeout(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Stream(err.to_string())
        }
    }
}

impl From<a2a_protocol::ProtocolError> for TransportError {
    fn from(err: a2a_protocol::ProtocolError) -> Self {
        TransportError::Decode(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Selection error: {0}")]
    Selection(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Dispatch(_) | AppError::Selection(_) => StatusCode::NOT_FOUND,
            AppError::Transport(_) | AppError::Registration(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_) | AppError::LLM(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
