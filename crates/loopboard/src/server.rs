//! Axum server setup and routing.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api;
use crate::state::AppState;
use crate::ws;

/// Create the Axum router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Event intake (pipeline-facing) plus viewer queries
    let api_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/pipeline/start", post(api::pipeline::pipeline_start))
        .route("/iteration/start", post(api::pipeline::iteration_start))
        .route("/step/start", post(api::pipeline::step_start))
        .route("/step/complete", post(api::pipeline::step_complete))
        .route("/pipeline/finish", post(api::pipeline::pipeline_finish))
        .route("/state", get(api::state::get_state));

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(ws::ws_handler))
        .layer(CompressionLayer::new())
        // TODO: Make CORS configurable; restrict origins in production
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
