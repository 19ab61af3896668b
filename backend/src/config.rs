//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::generation::pipeline::{PipelineOptions, DEFAULT_MAX_MESSAGE_LENGTH};
use crate::llm::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::llm::resilient::{
    RetryPolicy, DEFAULT_BACKOFF, DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_RETRIES,
};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Model provider configuration
    pub model: ModelConfig,
    /// Pipeline configuration
    pub generation: GenerationConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Model provider configuration
#[derive(Clone)]
pub struct ModelConfig {
    /// Gemini API key; empty when unset
    pub api_key: String,
    /// Model name
    pub model: String,
    /// API base URL
    pub base_url: String,
    /// Per-call timeout (in seconds)
    pub timeout_secs: u64,
    /// Retries after the first attempt for transient failures
    pub max_retries: u32,
    /// Base backoff between retries (in milliseconds)
    pub retry_backoff_ms: u64,
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("ModelConfig")
            .field("api_key", &api_key)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .finish()
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Longest accepted request message, in characters
    pub max_message_length: usize,
    /// Run the generate and explain stages concurrently
    pub parallel_stages: bool,
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = %raw, "Ignoring unparsable environment variable");
            default
        }),
        Err(_) => default,
    }
}

/// Like [`env_parse`], but zero also falls back to `default`.
fn env_nonzero(name: &str, default: u64) -> u64 {
    match env_parse(name, default) {
        0 => {
            tracing::warn!(var = name, "Ignoring zero value for environment variable");
            default
        }
        value => value,
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env_parse("PORT", 8080),
                host: env_string("HOST", "0.0.0.0"),
            },
            model: ModelConfig {
                api_key: env::var("GEMINI_API_KEY")
                    .map(|k| k.trim().to_string())
                    .unwrap_or_default(),
                model: env_string("GEMINI_MODEL", DEFAULT_MODEL),
                base_url: env_string("GEMINI_API_BASE_URL", DEFAULT_BASE_URL),
                timeout_secs: env_nonzero("MODEL_TIMEOUT_SECS", DEFAULT_CALL_TIMEOUT.as_secs()),
                max_retries: env_parse("MODEL_MAX_RETRIES", DEFAULT_MAX_RETRIES),
                retry_backoff_ms: env_parse(
                    "MODEL_RETRY_BACKOFF_MS",
                    DEFAULT_BACKOFF.as_millis() as u64,
                ),
            },
            generation: GenerationConfig {
                max_message_length: env_parse("MAX_MESSAGE_LENGTH", DEFAULT_MAX_MESSAGE_LENGTH),
                parallel_stages: env_flag("PARALLEL_STAGES"),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Timeout and retry settings for the model client
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.model.max_retries,
            call_timeout: Duration::from_secs(self.model.timeout_secs),
            backoff: Duration::from_millis(self.model.retry_backoff_ms),
        }
    }

    /// Options for the generation pipeline
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            max_message_length: self.generation.max_message_length,
            parallel_stages: self.generation.parallel_stages,
        }
    }
}
