use crate::{
    AppState,
    types::{AppError, QueryRequest, Result},
};
use axum::{
    Json,
    extract::State,
    response::sse::{Event, Sse},
};
use futures::{Stream, StreamExt};

/// Relay a request to the most suitable agent and stream its answer
///
/// The response is a `text/event-stream`; every event is one serialized
/// `StreamEvent`. The stream ends after the terminal `complete` or `error`
/// event. Closing the connection cancels the outbound agent call.
pub async fn stream_query(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>>> {
    if payload.user_input.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "user_input must not be empty".to_string(),
        ));
    }

    tracing::debug!(session_id = %payload.session_id, "Accepted stream query");

    let events = state
        .query_service
        .stream(payload.into())
        .map(|event| Event::default().json_data(event));

    Ok(Sse::new(events))
}
