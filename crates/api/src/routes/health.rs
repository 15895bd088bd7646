//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub workflow: &'static str,
    pub home_currency: String,
}

/// GET /health: liveness plus the engine's pricing currency.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        workflow: fulfillment::WORKFLOW_TYPE,
        home_currency: state.engine.home_currency().to_string(),
    })
}
