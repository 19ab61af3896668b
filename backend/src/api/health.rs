//! `GET /api/health`

use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy" while the server is running
    pub status: String,
    /// Crate version
    pub version: String,
    /// Configured model name
    pub model: String,
}

/// Report liveness, version and configured model.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.model.clone(),
    })
}
