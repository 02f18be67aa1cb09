use crate::{AppState, types::AgentInfo};
use axum::{Json, extract::State};

/// Agents currently registered and selectable, sorted by name
pub async fn list_agents(State(state): State<AppState>) -> Json<Vec<AgentInfo>> {
    Json(state.registry.agents())
}
