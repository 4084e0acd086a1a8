//! Route handlers.

use axum::{extract::State, Json};
use smartlight_core::StatusResponse;

use crate::AppState;

pub const HEALTH_MESSAGE: &str = "Smart Light Backend is running.";

/// `GET /status`. Always 200; "no data yet" is `ok: false`, not an error.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.status.get_status())
}

/// `GET /health`
pub async fn health() -> &'static str {
    HEALTH_MESSAGE
}
