//! Model client with bounded fixed-delay retry
//!
//! A [`ModelBackend`] performs exactly one request per call. [`ModelClient`]
//! owns the retry loop around it:
//! 1. Call the backend
//! 2. On success, return the raw text
//! 3. On any failure with attempts remaining: log WARN, sleep the
//!    fixed delay, try again
//! 4. Otherwise: log ERROR and return a single [`ProviderError`] carrying
//!    the last failure as its cause
//!
//! Attempts are strictly sequential. The delay is constant, not exponential.

use async_trait::async_trait;
use mcg_common::config::GenerationConfig;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Failure of a single backend attempt
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure (connect, timeout, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-2xx status
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected envelope
    #[error("Malformed response envelope: {0}")]
    Envelope(String),

    /// Backend reported an error inside a well-formed envelope
    #[error("Provider error: {0}")]
    Provider(String),

    /// No credential configured for the backend
    #[error("Missing credential: {0} is not configured")]
    MissingCredential(&'static str),
}

/// Terminal failure after the retry budget is spent
#[derive(Debug, Error)]
#[error("Generative backend failed after {attempts} attempt(s)")]
pub struct ProviderError {
    /// Number of backend calls made
    pub attempts: u32,
    /// Last underlying failure
    #[source]
    pub cause: BackendError,
}

/// One-shot access to a generative-text backend
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Send a prompt and return the raw text output
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Retry budget for model calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first (minimum 1)
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_delay_ms),
        )
    }
}

/// Attempt counter for one model call sequence
#[derive(Debug, Clone, Copy)]
struct GenerationAttempt {
    number: u32,
    max_attempts: u32,
}

impl GenerationAttempt {
    fn first(max_attempts: u32) -> Self {
        Self {
            number: 1,
            max_attempts: max_attempts.max(1),
        }
    }

    fn is_last(&self) -> bool {
        self.number >= self.max_attempts
    }

    fn next(self) -> Self {
        Self {
            number: self.number + 1,
            ..self
        }
    }
}

/// Retrying client around a [`ModelBackend`]
#[derive(Clone)]
pub struct ModelClient {
    backend: Arc<dyn ModelBackend>,
    policy: RetryPolicy,
}

impl ModelClient {
    pub fn new(backend: Arc<dyn ModelBackend>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Call the backend, retrying failures within the policy budget
    pub async fn call_model(&self, prompt: &str) -> Result<String, ProviderError> {
        let backend = self.backend.name();
        let mut attempt = GenerationAttempt::first(self.policy.max_attempts);

        loop {
            debug!(backend, attempt = attempt.number, "Calling generative backend");

            match self.backend.complete(prompt).await {
                Ok(text) => {
                    if attempt.number > 1 {
                        info!(
                            backend,
                            attempt = attempt.number,
                            "Generative backend succeeded after retry"
                        );
                    }
                    return Ok(text);
                }
                Err(err) => {
                    if attempt.is_last() {
                        error!(
                            backend,
                            attempt = attempt.number,
                            max_attempts = attempt.max_attempts,
                            error = %err,
                            "Generative backend call failed, giving up"
                        );
                        return Err(ProviderError {
                            attempts: attempt.number,
                            cause: err,
                        });
                    }

                    warn!(
                        backend,
                        attempt = attempt.number,
                        max_attempts = attempt.max_attempts,
                        delay_ms = self.policy.delay.as_millis() as u64,
                        error = %err,
                        "Generative backend call failed, will retry after delay"
                    );

                    tokio::time::sleep(self.policy.delay).await;
                    attempt = attempt.next();
                }
            }
        }
    }
}
