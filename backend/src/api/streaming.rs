//! `POST /generate/stream`
//!
//! Runs the pipeline in a background task and reports stage progress as
//! Server-Sent Events. The task is aborted when the client goes away.

use axum::{
    body::Body,
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use futures_util::{stream::Stream, StreamExt};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::generate::parse_body;
use super::AppState;
use crate::error::AppError;
use crate::generation::{GenerationError, GenerationResult, StageEvent};

/// Final SSE payload of every stream
pub const SSE_DONE_SIGNAL: &str = "[DONE]";

enum PipelineEvent {
    Stage(StageEvent),
    Finished(Result<GenerationResult, GenerationError>),
}

/// Aborts the pipeline task if the stream is dropped before it finishes.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Validate the request, then stream pipeline progress.
///
/// Input errors are returned as a plain JSON 400 before the stream opens.
pub async fn generate_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let request = parse_body(&headers, &body)?;
    state.pipeline.validate_request(&request)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let pipeline = state.pipeline.clone();
    let task = tokio::spawn(async move {
        let progress = tx.clone();
        let observer = move |event: StageEvent| {
            let _ = progress.send(PipelineEvent::Stage(event));
        };
        let result = pipeline.run_observed(&request, &observer).await;
        let _ = tx.send(PipelineEvent::Finished(result));
    });

    let sse_stream = create_stream(rx, AbortOnDrop(task))
        .map(|payload| Ok::<_, std::io::Error>(format!("data: {}\n\n", payload)));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(sse_stream))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build SSE response: {}", e)))
}

fn create_stream(
    mut rx: mpsc::UnboundedReceiver<PipelineEvent>,
    guard: AbortOnDrop,
) -> impl Stream<Item = String> {
    use async_stream::stream;

    stream! {
        let _guard = guard;

        while let Some(event) = rx.recv().await {
            match event {
                PipelineEvent::Stage(stage_event) => {
                    yield stage_payload(stage_event).to_string();
                }
                PipelineEvent::Finished(result) => {
                    yield finished_payload(result).to_string();
                    break;
                }
            }
        }

        yield SSE_DONE_SIGNAL.to_string();
    }
}

fn stage_payload(event: StageEvent) -> Value {
    match event {
        StageEvent::Started(stage) => json!({"stage": stage, "status": "running"}),
        StageEvent::Finished(stage) => json!({"stage": stage, "status": "done"}),
    }
}

fn finished_payload(result: Result<GenerationResult, GenerationError>) -> Value {
    match result {
        Ok(result) => json!({"status": "completed", "result": result}),
        Err(err) => {
            let err = AppError::from(err);
            err.log();
            let mut body = err.to_body();
            if let Some(object) = body.as_object_mut() {
                object.insert("status".to_string(), Value::from("error"));
            }
            body
        }
    }
}
