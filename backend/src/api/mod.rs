//! HTTP surface
//!
//! Axum router and handlers. Handlers only translate between the wire and
//! [`GenerationPipeline`]; all generation logic lives in
//! [`crate::generation`].

pub mod generate;
pub mod health;
pub mod middleware;
pub mod streaming;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::generation::GenerationPipeline;

/// Shared, read-only state handed to every handler
#[derive(Clone, Debug)]
pub struct AppState {
    /// Pipeline shared by all requests
    pub pipeline: Arc<GenerationPipeline>,
    /// Model name reported by the health endpoint
    pub model: String,
}

impl AppState {
    /// Wrap a pipeline for use as router state
    pub fn new(pipeline: GenerationPipeline, model: impl Into<String>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            model: model.into(),
        }
    }
}

/// Build the application router with all routes and layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/generate", post(generate::generate))
        .route("/generate/stream", post(streaming::generate_stream))
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
