//! HTTP API Handlers and Routes
//!
//! This module provides the gateway in front of the relay, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! - `POST /stream-query` - Relay a request to the best agent; answers with `text/event-stream`
//! - `GET /agents` - List registered remote agents
//! - `GET /health` - Health check endpoint
//!
//! Each event of `/stream-query` is one `data: <json>` frame, for example:
//! ```text
//! data: {"type":"status","text":"Hello"}
//!
//! data: {"type":"complete"}
//! ```

/// Request handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
