//! Language-model client
//!
//! The generation pipeline only ever talks to the model through the
//! [`ModelClient`] trait: one prompt string in, one completion string out.
//! [`GeminiClient`] is the HTTP implementation used in production and
//! [`ResilientClient`] wraps any client with a per-call timeout and bounded
//! retries for transient failures.
//!
//! ```text
//! GenerationPipeline
//!     |
//!     v
//! Arc<dyn ModelClient>
//!     |
//!     +-- ResilientClient { timeout, retries }
//!             |
//!             +-- GeminiClient --POST :generateContent--> provider
//! ```

pub mod error;
pub mod gemini;
pub mod gemini_types;
pub mod resilient;

pub use error::ModelError;
pub use gemini::GeminiClient;
pub use resilient::{ResilientClient, RetryPolicy};

use async_trait::async_trait;

/// Output format requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Free-form text
    Text,
    /// Ask the provider to constrain the completion to JSON
    Json,
}

/// A capability that turns a prompt into a completion.
///
/// No contract is assumed about the completion beyond "it is text": callers
/// must validate structure themselves.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Short provider name used in logs (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send `prompt` to the model and return the completion text.
    async fn complete(&self, prompt: &str, format: ResponseFormat) -> Result<String, ModelError>;
}

// ModelClient is stored as `Arc<dyn ModelClient>` by the pipeline.
const _: () = {
    fn _assert_object_safe(_: &dyn ModelClient) {}
};
