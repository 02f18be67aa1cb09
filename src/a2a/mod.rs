//! Remote agent transport.
//!
//! Thin HTTP adapter over the [`a2a_protocol`] wire types: card discovery via
//! [`AgentCardResolver`] and streaming calls via [`A2AClient`]. The relay only
//! sees the [`RemoteAgentClient`] trait, so endpoints can be replaced by
//! in-memory implementations.

pub mod card;
pub mod client;

pub use card::AgentCardResolver;
pub use client::{A2AClient, FrameStream, RemoteAgentClient};

use std::time::Duration;

/// Build the shared HTTP client used for card fetches and streaming calls.
///
/// The timeout bounds connection setup and each individual read, not the
/// whole response, so long-running streams stay open while frames keep
/// arriving.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .build()
}
