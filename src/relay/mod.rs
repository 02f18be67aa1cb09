//! Streaming relay between callers and remote agents
//!
//! [`AgentQueryService`] handles one query at a time per call: it asks the
//! selector for a target among the registered agents, sends the query to that
//! agent as a streaming call and re-emits every remote frame as a normalized
//! [`StreamEvent`].
//!
//! The returned stream always ends with exactly one terminal event
//! (`complete` or `error`). Dropping it early drops the remote frame stream
//! and with it the outbound connection.

pub mod frames;

pub use frames::{PROCESSING_PLACEHOLDER, build_envelope, normalize_frame};

use crate::agents::{AgentRegistry, AgentSelector};
use crate::types::{Query, StreamEvent};
use crate::utils::toml_config::RelaySettings;
use async_stream::stream;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};

pub const NO_AGENTS_AVAILABLE: &str = "No agents available";
pub const NO_SUITABLE_AGENT: &str = "No suitable agent found";
pub const STREAM_ENDED_EARLY: &str = "Agent stream ended before the task completed";

/// Behavioral switches of the relay.
#[derive(Debug, Clone)]
pub struct RelayOptions {
    pub emit_processing_placeholder: bool,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            emit_processing_placeholder: true,
        }
    }
}

impl From<&RelaySettings> for RelayOptions {
    fn from(settings: &RelaySettings) -> Self {
        Self {
            emit_processing_placeholder: settings.emit_processing_placeholder,
        }
    }
}

/// Orchestrates registry, selector and remote call for each query.
#[derive(Clone)]
pub struct AgentQueryService {
    registry: Arc<AgentRegistry>,
    selector: Arc<dyn AgentSelector>,
    options: RelayOptions,
}

impl AgentQueryService {
    pub fn new(
        registry: Arc<AgentRegistry>,
        selector: Arc<dyn AgentSelector>,
        options: RelayOptions,
    ) -> Self {
        Self {
            registry,
            selector,
            options,
        }
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Relay one query, yielding normalized events as the remote agent produces them.
    ///
    /// The stream is lazy: nothing happens until it is polled, and it can be
    /// consumed only once.
    pub fn stream(&self, query: Query) -> BoxStream<'static, StreamEvent> {
        let registry = Arc::clone(&self.registry);
        let selector = Arc::clone(&self.selector);
        let emit_placeholder = self.options.emit_processing_placeholder;
        let span = info_span!(
            "relay",
            session_id = %query.session_id,
            agent = tracing::field::Empty
        );

        let events = stream! {
            let candidates = registry.list_available();
            if candidates.is_empty() {
                warn!(parent: &span, "No agents registered");
                yield StreamEvent::error(NO_AGENTS_AVAILABLE);
                return;
            }

            let selected = selector
                .select(&query.user_input, &candidates)
                .instrument(span.clone())
                .await;
            let name = match selected {
                Some(name) => name,
                None => {
                    yield StreamEvent::error(NO_SUITABLE_AGENT);
                    return;
                }
            };
            span.record("agent", name.as_str());

            let client = match registry.client_for(&name) {
                Some(client) => client,
                None => {
                    error!(parent: &span, "Selected agent has no bound client");
                    yield StreamEvent::error(format!("Agent client not found: {}", name));
                    return;
                }
            };

            let request = build_envelope(&query);
            info!(parent: &span, request_id = %request.id, url = %client.url(), "Dispatching query");

            let opened = client
                .send_message_streaming(request)
                .instrument(span.clone())
                .await;
            let mut frames = match opened {
                Ok(frames) => frames,
                Err(e) => {
                    error!(parent: &span, error = %e, "Failed to open agent stream");
                    yield StreamEvent::error(format!("Agent transport error: {}", e));
                    return;
                }
            };

            while let Some(frame) = frames.next().await {
                let frame = match frame {
                    Ok(frame) => frame,
                    Err(e) => {
                        error!(parent: &span, error = %e, "Agent stream failed");
                        yield StreamEvent::error(format!("Agent transport error: {}", e));
                        return;
                    }
                };

                let Some(event) = normalize_frame(&frame, emit_placeholder) else {
                    continue;
                };
                debug!(parent: &span, kind = event.kind(), "Relaying event");

                let done = event == StreamEvent::Complete;
                yield event;
                if done {
                    info!(parent: &span, "Agent task completed");
                    return;
                }
            }

            warn!(parent: &span, "Agent stream closed without a final frame");
            yield StreamEvent::error(STREAM_ENDED_EARLY);
        };

        events.boxed()
    }
}
