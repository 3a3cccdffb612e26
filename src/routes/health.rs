//! Health check endpoint for container orchestration.
//!
//! Liveness probe: returns 200 with the build identity whenever the process
//! can answer HTTP. It does not touch the request counter.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::{AppState, BuildInfo};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub health: &'static str,
    #[serde(flatten)]
    pub build: BuildInfo,
}

/// Health check handler.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        health: "ok",
        build: BuildInfo::clone(&state.build),
    })
}
