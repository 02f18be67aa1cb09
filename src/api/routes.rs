use crate::AppState;
use crate::api::handlers;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/stream-query", post(handlers::query::stream_query))
        .route("/agents", get(handlers::agents::list_agents))
        .route("/health", get(handlers::health))
}

/// Full application: routes, CORS and request tracing, bound to `state`
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
