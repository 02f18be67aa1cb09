use crate::types::TransportError;
use a2a_protocol::{SendStreamingMessageRequest, SseDecoder, StreamResponse};
use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

/// Ordered frames of one remote streaming call.
///
/// Dropping the stream drops the underlying HTTP response, which closes the
/// connection; this is how caller cancellation reaches the remote agent.
pub type FrameStream = BoxStream<'static, Result<StreamResponse, TransportError>>;

/// A bound handle to one remote agent endpoint.
#[async_trait]
pub trait RemoteAgentClient: Send + Sync {
    /// Send a message and receive the remote agent's frames as they arrive.
    async fn send_message_streaming(
        &self,
        request: SendStreamingMessageRequest,
    ) -> Result<FrameStream, TransportError>;

    /// Endpoint this client posts to.
    fn url(&self) -> &str;
}

/// JSON-RPC over HTTP client for an A2A endpoint.
pub struct A2AClient {
    http: reqwest::Client,
    url: String,
}

impl A2AClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RemoteAgentClient for A2AClient {
    async fn send_message_streaming(
        &self,
        request: SendStreamingMessageRequest,
    ) -> Result<FrameStream, TransportError> {
        let response = self
            .http
            .post(&self.url)
            .header(ACCEPT, "text/event-stream")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("text/event-stream"))
            .unwrap_or(true);

        // Some servers answer a streaming call with a single JSON-RPC body
        if !is_event_stream {
            let text = response.text().await?;
            let frame = StreamResponse::from_json(&text)?;
            return Ok(futures::stream::once(async move { Ok(frame) }).boxed());
        }

        let mut body = Box::pin(response.bytes_stream());
        let frames = stream! {
            let mut decoder = SseDecoder::new();

            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(TransportError::from(e));
                        return;
                    }
                };

                let events = match decoder.push(&chunk) {
                    Ok(events) => events,
                    Err(e) => {
                        yield Err(TransportError::from(e));
                        return;
                    }
                };

                for event in events {
                    yield StreamResponse::from_json(&event.data).map_err(TransportError::from);
                }
            }

            match decoder.finish() {
                Ok(Some(event)) => {
                    yield StreamResponse::from_json(&event.data).map_err(TransportError::from);
                }
                Ok(None) => {}
                Err(e) => yield Err(TransportError::from(e)),
            }
        };

        Ok(frames.boxed())
    }

    fn url(&self) -> &str {
        &self.url
    }
}
