//! Request handlers. Every handler clones what it needs out of the shared
//! state and releases the lock before serialising.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use lookout_core::{ActivityEvent, AgentStatus};
use lookout_engine::{DashboardState, Health};
use serde_json::json;
use tracing::debug;

pub type SharedState = Arc<DashboardState>;

/// `GET /agents`
pub async fn agents(State(state): State<SharedState>) -> Json<Vec<AgentStatus>> {
    Json(state.statuses())
}

/// `GET /activity`
pub async fn activity(State(state): State<SharedState>) -> Json<Vec<ActivityEvent>> {
    Json(state.activity())
}

/// `GET /health`
pub async fn health(State(state): State<SharedState>) -> Json<Health> {
    Json(state.health())
}

/// Bare `OPTIONS` on a known route.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    debug!(path = %uri.path(), "No such route");
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}
