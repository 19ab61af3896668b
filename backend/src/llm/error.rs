//! Model client error types
//!
//! Errors that can occur while calling the language-model provider.

use std::time::Duration;
use thiserror::Error;

/// Errors returned by a [`super::ModelClient`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// No API key was configured for the provider
    #[error("Model API key is not configured")]
    MissingApiKey,

    /// The HTTP request could not be sent or the response could not be read
    #[error("Failed to reach model provider: {0}")]
    Transport(String),

    /// The call did not finish within the configured timeout
    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    /// The provider rejected the call with HTTP 429
    #[error("Model provider rate limit exceeded: {0}")]
    RateLimited(String),

    /// The provider returned a non-success HTTP status
    #[error("Model provider returned error status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Excerpt of the response body
        body: String,
    },

    /// The provider refused to answer the prompt (safety filter)
    #[error("Model provider blocked the prompt: {0}")]
    Blocked(String),

    /// The provider answered but the answer contained no text
    #[error("Model response contained no text: {0}")]
    EmptyResponse(String),

    /// The provider response body was not the expected JSON envelope
    #[error("Failed to decode model response: {0}")]
    Decode(String),
}

impl ModelError {
    /// Whether retrying the same call may succeed.
    ///
    /// Network failures, timeouts, rate limiting and 5xx responses are
    /// transient. Configuration problems, 4xx responses, blocked prompts and
    /// undecodable bodies are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) | Self::RateLimited(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::MissingApiKey | Self::Blocked(_) | Self::EmptyResponse(_) | Self::Decode(_) => {
                false
            }
        }
    }
}
