//! `POST /generate`

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::error::AppError;
use crate::generation::{GenerationRequest, GenerationResult};

/// Message returned when the body cannot be decoded
pub const MALFORMED_BODY: &str = "Malformed request body";

/// Request body shared by `/generate` and `/generate/stream`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequestBody {
    /// The user's instruction
    #[serde(default)]
    pub message: Option<String>,
    /// Code from an earlier generation, when iterating
    #[serde(default)]
    pub previous_code: Option<String>,
}

impl From<GenerateRequestBody> for GenerationRequest {
    fn from(body: GenerateRequestBody) -> Self {
        GenerationRequest {
            message: body.message.unwrap_or_default(),
            previous_artifact: body.previous_code,
        }
    }
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Decode the request body.
///
/// A missing body or a non-JSON content type carries no message, so it
/// decodes to an empty request and fails message validation. Only a JSON
/// body that cannot be decoded is reported as malformed.
pub fn parse_body(headers: &HeaderMap, body: &Bytes) -> Result<GenerationRequest, AppError> {
    if !is_json_content_type(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateRequestBody::default().into());
    }

    serde_json::from_slice::<GenerateRequestBody>(body)
        .map(Into::into)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected request body");
            AppError::InvalidInput(MALFORMED_BODY.to_string())
        })
}

/// Run the pipeline and return the full result.
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<GenerationResult>, AppError> {
    let request = parse_body(&headers, &body)?;

    tracing::info!(
        message_len = request.message.len(),
        has_previous = request.previous().is_some(),
        "Generation requested"
    );

    let result = state.pipeline.run(&request).await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_uses_camel_case() {
        let body: GenerateRequestBody =
            serde_json::from_str(r#"{"message": "Add a button", "previousCode": "<></>"}"#)
                .unwrap();
        let request: GenerationRequest = body.into();
        assert_eq!(request.message, "Add a button");
        assert_eq!(request.previous_artifact.as_deref(), Some("<></>"));
    }

    #[test]
    fn test_missing_fields_default() {
        let body: GenerateRequestBody = serde_json::from_str(r#"{"previousCode": null}"#).unwrap();
        let request: GenerationRequest = body.into();
        assert!(request.message.is_empty());
        assert!(request.previous_artifact.is_none());
    }

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        headers
    }

    #[test]
    fn test_empty_or_non_json_body_has_no_message() {
        let request = parse_body(&json_headers(), &Bytes::from_static(b"")).unwrap();
        assert!(request.message.is_empty());

        let request = parse_body(&HeaderMap::new(), &Bytes::from_static(b"")).unwrap();
        assert!(request.message.is_empty());

        let mut text = HeaderMap::new();
        text.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        let request = parse_body(&text, &Bytes::from_static(br#"{"message": "hi"}"#)).unwrap();
        assert!(request.message.is_empty());
    }

    #[test]
    fn test_json_charset_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            "application/json; charset=utf-8".parse().unwrap(),
        );
        let request = parse_body(&headers, &Bytes::from_static(br#"{"message": "hi"}"#)).unwrap();
        assert_eq!(request.message, "hi");
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        for body in ["{not json", r#"{"message": 3}"#, "42"] {
            match parse_body(&json_headers(), &Bytes::from(body)) {
                Err(AppError::InvalidInput(message)) => assert_eq!(message, MALFORMED_BODY),
                other => panic!("expected malformed body for {}, got {:?}", body, other),
            }
        }
    }
}
