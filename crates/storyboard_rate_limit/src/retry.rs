//! Bounded retry with exponential backoff.

use crate::{RateLimiter, RetryConfig};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use storyboard_core::GenerateRequest;
use storyboard_error::{GenerationError, GenerationErrorKind, GenerationResult, RetryableError};
use storyboard_interface::{CancelToken, TextGenerator};
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, instrument, warn};

/// Backoff schedule for transient generation failures.
///
/// Delays double from `initial_backoff` up to `max_delay`. Each delay is
/// jittered within its upper half, so delays strictly increase until they
/// reach the cap.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct RetryPolicy {
    /// Total attempts including the first
    max_attempts: usize,
    /// Delay before the first retry
    initial_backoff: Duration,
    /// Cap on any single delay
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_secs(config.max_delay_secs),
        )
    }
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: usize, initial_backoff: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_delay,
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Delays between attempts; yields `max_attempts - 1` items.
    pub fn strategy(&self) -> impl Iterator<Item = Duration> + use<> {
        // base 2 scaled by half the initial delay gives initial, 2x initial, 4x initial...
        let factor = (self.initial_backoff.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max_delay)
            .map(|delay| delay / 2 + jitter(delay / 2))
            .take(self.max_attempts - 1)
    }
}

/// A `TextGenerator` decorator adding retry, throttling and cancellation.
///
/// For each attempt:
/// 1. Acquires limiter permission when a limiter is configured
/// 2. Calls the inner generator with `attempt` set to the attempt ordinal
/// 3. Retries transient errors (rate limit, server, transport) with backoff
/// 4. Returns permanent errors (auth, bad request, malformed) immediately
///
/// When a [`CancelToken`] is attached, cancelling it aborts the in-flight
/// attempt or backoff sleep and yields `GenerationErrorKind::Cancelled`.
#[derive(Debug, Clone)]
pub struct RetryingGenerator<G> {
    inner: G,
    policy: RetryPolicy,
    limiter: Option<RateLimiter>,
    cancel: Option<CancelToken>,
}

impl<G: TextGenerator> RetryingGenerator<G> {
    /// Wrap `inner` with the given policy.
    pub fn new(inner: G, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            limiter: None,
            cancel: None,
        }
    }

    /// Throttle every attempt through `limiter`.
    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Abort calls when `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The wrapped generator.
    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// The retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn run(&self, req: &GenerateRequest) -> GenerationResult<String> {
        let attempts = AtomicU32::new(0);

        Retry::spawn(self.policy.strategy(), || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            let request = req.with_attempt(attempt);
            async move {
                let _guard = match &self.limiter {
                    Some(limiter) => Some(limiter.acquire().await.map_err(RetryError::Permanent)?),
                    None => None,
                };

                debug!(attempt, "Calling generator");
                match self.inner.generate(&request).await {
                    Ok(text) => Ok(text),
                    Err(e) if e.is_retryable() => {
                        warn!(attempt, error = %e, kind = e.kind.label(), "Transient error, will retry");
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    }
                    Err(e) => {
                        warn!(attempt, error = %e, kind = e.kind.label(), "Permanent error, failing immediately");
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        })
        .await
    }
}

#[async_trait]
impl<G: TextGenerator> TextGenerator for RetryingGenerator<G> {
    #[instrument(
        skip(self, req),
        fields(
            provider = self.inner.provider_name(),
            max_attempts = self.policy.max_attempts
        )
    )]
    async fn generate(&self, req: &GenerateRequest) -> GenerationResult<String> {
        let Some(token) = &self.cancel else {
            return self.run(req).await;
        };

        if token.is_cancelled() {
            return Err(GenerationError::new(GenerationErrorKind::Cancelled));
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("Generation cancelled");
                Err(GenerationError::new(GenerationErrorKind::Cancelled))
            }
            result = self.run(req) => result,
        }
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
