//! Error types and error handling for the HTTP surface
//!
//! [`AppError`] is the boundary error: every handler failure is converted to
//! one of its variants, which maps to a status code and a JSON body of the
//! form `{"message": ..., "code": ...}`. Internal details never reach the
//! client beyond the optional `stage` and `detail` fields.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::generation::{GenerationError, PlanError, Stage};
use crate::llm::ModelError;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// The request is missing data or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A model call failed for a reason other than a timeout
    #[error("Model service unavailable during {stage} stage: {source}")]
    UpstreamUnavailable {
        /// Stage whose call failed
        stage: Stage,
        /// Underlying client error
        #[source]
        source: ModelError,
    },

    /// A model call timed out
    #[error("Model service timed out during {stage} stage")]
    UpstreamTimeout {
        /// Stage whose call timed out
        stage: Stage,
    },

    /// The planner's output could not be used
    #[error("Malformed plan: {0}")]
    MalformedPlan(PlanError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::InvalidInput(message) => AppError::InvalidInput(message),
            GenerationError::Upstream {
                stage,
                source: ModelError::Timeout(_),
            } => AppError::UpstreamTimeout { stage },
            GenerationError::Upstream { stage, source } => {
                AppError::UpstreamUnavailable { stage, source }
            }
            GenerationError::MalformedPlan(plan_error) => AppError::MalformedPlan(plan_error),
        }
    }
}

impl AppError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::UpstreamUnavailable { .. } => "upstream_unavailable",
            AppError::UpstreamTimeout { .. } => "upstream_timeout",
            AppError::MalformedPlan(_) => "malformed_plan",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            AppError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::MalformedPlan(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body sent to the client
    pub fn to_body(&self) -> Value {
        match self {
            AppError::InvalidInput(message) => json!({
                "message": message,
                "code": self.code(),
            }),
            AppError::UpstreamUnavailable { stage, .. } => json!({
                "message": "Model service unavailable",
                "code": self.code(),
                "stage": stage,
            }),
            AppError::UpstreamTimeout { stage } => json!({
                "message": "Model service timed out",
                "code": self.code(),
                "stage": stage,
            }),
            AppError::MalformedPlan(plan_error) => json!({
                "message": "Planner returned an invalid plan",
                "code": self.code(),
                "stage": Stage::Plan,
                "detail": plan_error.to_string(),
            }),
            AppError::Internal(_) => json!({
                "message": "Internal server error",
                "code": self.code(),
            }),
        }
    }

    /// Log the error once, at a level matching who is at fault.
    pub fn log(&self) {
        let status = self.status().as_u16();
        if self.status().is_client_error() {
            tracing::warn!(status = status, code = self.code(), error = %self, "Request rejected");
        } else {
            tracing::error!(status = status, code = self.code(), error = %self, "Request failed");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::SchemaViolation;
    use std::time::Duration;

    #[test]
    fn test_timeout_maps_to_504() {
        let err: AppError = GenerationError::Upstream {
            stage: Stage::Generate,
            source: ModelError::Timeout(Duration::from_secs(30)),
        }
        .into();
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            err.to_body(),
            json!({"message": "Model service timed out", "code": "upstream_timeout", "stage": "generate"})
        );
    }

    #[test]
    fn test_upstream_failure_maps_to_502() {
        let err: AppError = GenerationError::Upstream {
            stage: Stage::Plan,
            source: ModelError::Status {
                status: 503,
                body: "secret provider detail".into(),
            },
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.code(), "upstream_unavailable");
        assert!(!err.to_body().to_string().contains("secret provider detail"));
    }

    #[test]
    fn test_malformed_plan_body_has_detail() {
        let err: AppError =
            GenerationError::MalformedPlan(PlanError::Schema(SchemaViolation::MissingType)).into();
        let body = err.to_body();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "malformed_plan");
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .contains("missing \"type\" field"));
    }

    #[test]
    fn test_internal_error_hides_cause() {
        let err = AppError::Internal(anyhow::anyhow!("database password is hunter2"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_body(),
            json!({"message": "Internal server error", "code": "internal_error"})
        );
    }

    #[test]
    fn test_invalid_input_is_400() {
        let err: AppError = GenerationError::InvalidInput("Input message required".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_body()["message"], "Input message required");
    }
}
