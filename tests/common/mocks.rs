//! Mock implementations for testing.
//!
//! This module provides mock LLM clients, selectors and remote agents that can
//! be used across different test files without duplication.

#![allow(dead_code)]

use a2a_protocol::{SendStreamingMessageRequest, StreamResponse};
use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use relay::a2a::{FrameStream, RemoteAgentClient};
use relay::agents::AgentSelector;
use relay::llm::LLMClient;
use relay::types::{AgentDescriptor, AgentSummary, AppError, Result, TransportError};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Mock LLM client for testing with configurable responses.
///
/// Every prompt it receives is recorded so tests can assert on what the
/// selector asked.
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            should_fail: true,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Prompts received so far, system prompt and user prompt joined by a newline.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.prompts.lock().push(format!("{}\n{}", system, prompt));
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Selector that always answers with a fixed name.
pub struct FixedSelector(pub Option<String>);

impl FixedSelector {
    pub fn picks(name: &str) -> Self {
        Self(Some(name.to_string()))
    }

    pub fn nothing() -> Self {
        Self(None)
    }
}

#[async_trait]
impl AgentSelector for FixedSelector {
    async fn select(&self, _query: &str, _candidates: &[AgentSummary]) -> Option<String> {
        self.0.clone()
    }
}

/// One step of a scripted remote stream.
#[derive(Clone)]
pub enum Step {
    Frame(Value),
    Fail(TransportError),
}

/// Sets its flag when the frame stream holding it is dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// In-memory remote agent replaying a fixed script.
///
/// Requests are recorded for envelope assertions.
pub struct ScriptedAgent {
    url: String,
    script: Vec<Step>,
    open_error: Option<TransportError>,
    /// Keep the stream pending after the script, like a live connection
    hold_open: bool,
    stream_dropped: Arc<AtomicBool>,
    requests: Mutex<Vec<SendStreamingMessageRequest>>,
}

impl ScriptedAgent {
    pub fn new(url: &str, script: Vec<Step>) -> Self {
        Self {
            url: url.to_string(),
            script,
            open_error: None,
            hold_open: false,
            stream_dropped: Arc::new(AtomicBool::new(false)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Agent that replays `script` and then never ends its stream.
    pub fn held_open(url: &str, script: Vec<Step>) -> Self {
        Self {
            hold_open: true,
            ..Self::new(url, script)
        }
    }

    /// Agent whose streaming call cannot even be opened.
    pub fn unreachable(url: &str, error: TransportError) -> Self {
        Self {
            open_error: Some(error),
            ..Self::new(url, Vec::new())
        }
    }

    /// Whether a frame stream handed out by this agent has been dropped.
    pub fn stream_dropped(&self) -> bool {
        self.stream_dropped.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SendStreamingMessageRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl RemoteAgentClient for ScriptedAgent {
    async fn send_message_streaming(
        &self,
        request: SendStreamingMessageRequest,
    ) -> std::result::Result<FrameStream, TransportError> {
        self.requests.lock().push(request);

        if let Some(error) = &self.open_error {
            return Err(error.clone());
        }

        let frames: Vec<_> = self
            .script
            .iter()
            .cloned()
            .map(|step| match step {
                Step::Frame(value) => {
                    StreamResponse::from_value(value).map_err(TransportError::from)
                }
                Step::Fail(error) => Err(error),
            })
            .collect();

        let guard = DropFlag(Arc::clone(&self.stream_dropped));
        let frames = futures::stream::iter(frames).map(move |frame| {
            let _guard = &guard;
            frame
        });

        if self.hold_open {
            Ok(frames.chain(futures::stream::pending()).boxed())
        } else {
            Ok(frames.boxed())
        }
    }

    fn url(&self) -> &str {
        &self.url
    }
}

pub fn descriptor(name: &str, url: &str) -> AgentDescriptor {
    AgentDescriptor {
        name: name.to_string(),
        description: format!("{} for tests", name),
        endpoint_url: url.to_string(),
    }
}

// ============= Frame builders =============

pub fn working(text: &str) -> Step {
    Step::Frame(json!({
        "jsonrpc": "2.0",
        "id": "1",
        "result": {
            "kind": "status-update",
            "taskId": "task-1",
            "contextId": "ctx-1",
            "status": {
                "state": "working",
                "message": {
                    "kind": "message",
                    "role": "agent",
                    "messageId": "m-1",
                    "parts": [{"kind": "text", "text": text}]
                }
            },
            "final": false
        }
    }))
}

pub fn working_without_message() -> Step {
    Step::Frame(json!({
        "jsonrpc": "2.0",
        "id": "1",
        "result": {
            "kind": "status-update",
            "taskId": "task-1",
            "contextId": "ctx-1",
            "status": {"state": "working", "message": null},
            "final": false
        }
    }))
}

pub fn completed() -> Step {
    Step::Frame(json!({
        "jsonrpc": "2.0",
        "id": "1",
        "result": {
            "kind": "status-update",
            "taskId": "task-1",
            "contextId": "ctx-1",
            "status": {"state": "completed"},
            "final": true
        }
    }))
}

pub fn rpc_error(message: &str) -> Step {
    Step::Frame(json!({"jsonrpc": "2.0", "id": "1", "error": message}))
}

pub fn null_result() -> Step {
    Step::Frame(json!({"jsonrpc": "2.0", "id": "1", "result": null}))
}

pub fn task_snapshot() -> Step {
    Step::Frame(json!({
        "jsonrpc": "2.0",
        "id": "1",
        "result": {"kind": "task", "id": "task-1", "contextId": "ctx-1", "status": {"state": "submitted"}}
    }))
}

/// Terminal notification carrying nothing but the final flag.
pub fn bare_final() -> Step {
    Step::Frame(json!({"jsonrpc": "2.0", "id": "1", "result": {"kind": "status-update", "final": true}}))
}
