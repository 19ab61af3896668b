//! Timeout and retry wrapper for model clients

use async_trait::async_trait;
use std::time::Duration;

use super::{ModelClient, ModelError, ResponseFormat};

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default per-call timeout
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Default base backoff between attempts
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// How a [`ResilientClient`] bounds and retries calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 disables retrying
    pub max_retries: u32,
    /// Upper bound for a single attempt
    pub call_timeout: Duration,
    /// Base delay; attempt `n` waits `backoff * n` before retrying
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

/// Wraps a [`ModelClient`] with a per-call timeout and bounded retries.
///
/// Only transient errors (see [`ModelError::is_transient`]) are retried.
#[derive(Debug)]
pub struct ResilientClient<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: ModelClient> ResilientClient<C> {
    /// Wrap `inner` with `policy`.
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped client
    pub fn inner(&self) -> &C {
        &self.inner
    }

    async fn attempt(&self, prompt: &str, format: ResponseFormat) -> Result<String, ModelError> {
        match tokio::time::timeout(self.policy.call_timeout, self.inner.complete(prompt, format))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ModelError::Timeout(self.policy.call_timeout)),
        }
    }
}

#[async_trait]
impl<C: ModelClient> ModelClient for ResilientClient<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(&self, prompt: &str, format: ResponseFormat) -> Result<String, ModelError> {
        let mut attempt = 0u32;
        loop {
            match self.attempt(prompt, format).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_transient() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    let delay = self.policy.backoff * attempt;
                    tracing::warn!(
                        client = %self.inner.name(),
                        attempt = attempt,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient model error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum Step {
        Reply(Result<String, ModelError>),
        Hang,
    }

    struct Scripted {
        steps: Mutex<VecDeque<Step>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ModelClient for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _: &str, _: ResponseFormat) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.steps.lock().unwrap().pop_front();
            match step {
                Some(Step::Reply(result)) => result,
                Some(Step::Hang) => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok("too late".to_string())
                }
                None => panic!("unexpected extra call"),
            }
        }
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            call_timeout: Duration::from_millis(50),
            backoff: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let client = ResilientClient::new(
            Scripted::new(vec![
                Step::Reply(Err(ModelError::Transport("reset".into()))),
                Step::Reply(Err(ModelError::Status {
                    status: 502,
                    body: String::new(),
                })),
                Step::Reply(Ok("done".into())),
            ]),
            fast_policy(2),
        );

        let result = client.complete("p", ResponseFormat::Text).await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let client = ResilientClient::new(
            Scripted::new(vec![
                Step::Reply(Err(ModelError::RateLimited("a".into()))),
                Step::Reply(Err(ModelError::RateLimited("b".into()))),
            ]),
            fast_policy(1),
        );

        let result = client.complete("p", ResponseFormat::Text).await;
        assert_eq!(result, Err(ModelError::RateLimited("b".into())));
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_does_not_retry_permanent_errors() {
        let client = ResilientClient::new(
            Scripted::new(vec![Step::Reply(Err(ModelError::Status {
                status: 400,
                body: "bad request".into(),
            }))]),
            fast_policy(2),
        );

        let result = client.complete("p", ResponseFormat::Json).await;
        assert!(matches!(result, Err(ModelError::Status { status: 400, .. })));
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_reported_and_retried() {
        let client = ResilientClient::new(
            Scripted::new(vec![Step::Hang, Step::Reply(Ok("recovered".into()))]),
            fast_policy(1),
        );

        let result = client.complete("p", ResponseFormat::Text).await;
        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_without_retries() {
        let client = ResilientClient::new(Scripted::new(vec![Step::Hang]), fast_policy(0));

        let result = client.complete("p", ResponseFormat::Text).await;
        assert_eq!(result, Err(ModelError::Timeout(Duration::from_millis(50))));
    }
}
