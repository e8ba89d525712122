//! On-demand full-state query.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::auth::ViewerAuth;
use crate::snapshot::Snapshot;
use crate::state::AppState;

/// GET /api/state - Full current snapshot (gated by viewer credentials).
pub async fn get_state(_auth: ViewerAuth, State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.hub.state())
}
