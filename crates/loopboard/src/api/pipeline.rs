//! Pipeline lifecycle event endpoints.
//!
//! Called by the external pipeline process. Each handler applies exactly one
//! hub operation and acknowledges; malformed business data degrades to
//! defaults rather than erroring (see [`crate::dto`]).

use std::sync::Arc;

use axum::{Json, extract::State};
use serde_json::Value;
use tracing::info;

use crate::dto::{
    Ack, IterationStartRequest, PipelineFinishRequest, PipelineStartRequest, StepCompleteRequest,
    StepStartRequest,
};
use crate::state::AppState;

/// POST /api/pipeline/start - A new run begins; prior state is discarded.
pub async fn pipeline_start(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PipelineStartRequest>,
) -> Json<Ack> {
    info!(max_iterations = req.max_iterations, "pipeline started");
    state.hub.pipeline_start(req.max_iterations);
    Json(Ack::ok())
}

/// POST /api/iteration/start - The run enters a new iteration.
pub async fn iteration_start(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IterationStartRequest>,
) -> Json<Ack> {
    let number = state.hub.iteration_start(req.number);
    info!(number, "iteration started");
    Json(Ack::ok())
}

/// POST /api/step/start - A step begins within the current iteration.
pub async fn step_start(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StepStartRequest>,
) -> Json<Ack> {
    info!(step = %req.step, "step started");
    state.hub.step_start(req.step);
    Json(Ack::ok())
}

/// POST /api/step/complete - A step finished; its result is recorded.
pub async fn step_complete(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StepCompleteRequest>,
) -> Json<Ack> {
    info!(step = %req.step, "step completed");
    state.hub.step_complete(req.step, Value::Object(req.result));
    Json(Ack::ok())
}

/// POST /api/pipeline/finish - The run ends with a status and summary.
pub async fn pipeline_finish(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PipelineFinishRequest>,
) -> Json<Ack> {
    info!(status = ?req.status, "pipeline finished");
    state.hub.pipeline_finish(req.status, req.summary);
    Json(Ack::ok())
}
