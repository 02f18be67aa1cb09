//! API request handlers.

/// Agent listing handlers.
pub mod agents;
/// Streaming query handler.
pub mod query;

/// Liveness probe
pub async fn health() -> &'static str {
    "OK"
}
