//! Request throttling using governor and a Tokio semaphore.

use crate::ThrottleConfig;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use storyboard_error::{GenerationError, GenerationErrorKind, GenerationResult};
use tokio::sync::Semaphore;

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Client-side limiter for generation calls.
///
/// - **RPM** (requests per minute): enforced via governor (GCRA)
/// - **Concurrent requests**: enforced via a Tokio semaphore
///
/// Clones share the same quotas.
///
/// # Example
///
/// ```
/// use storyboard_rate_limit::{RateLimiter, ThrottleConfig};
///
/// # #[tokio::main]
/// # async fn main() {
/// let limiter = RateLimiter::new(&ThrottleConfig { rpm: Some(60), max_concurrent: Some(2) });
/// let guard = limiter.acquire().await.unwrap();
/// drop(guard);
/// # }
/// ```
#[derive(Clone)]
pub struct RateLimiter {
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
    concurrent_semaphore: Arc<Semaphore>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("rpm_limited", &self.rpm_limiter.is_some())
            .field(
                "available_permits",
                &self.concurrent_semaphore.available_permits(),
            )
            .finish()
    }
}

impl RateLimiter {
    /// Build a limiter; `None` limits are not enforced.
    pub fn new(throttle: &ThrottleConfig) -> Self {
        let rpm_limiter = throttle.rpm.and_then(|rpm| {
            NonZeroU32::new(rpm).map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))))
        });

        let max_concurrent = throttle
            .max_concurrent
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(Semaphore::MAX_PERMITS);

        Self {
            rpm_limiter,
            concurrent_semaphore: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Wait for an RPM slot, then a concurrency slot.
    ///
    /// The concurrency slot is released when the guard drops.
    ///
    /// # Errors
    ///
    /// Fails with `Transport` only if the semaphore was closed.
    pub async fn acquire(&self) -> GenerationResult<RateLimiterGuard> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }

        let permit = self
            .concurrent_semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| {
                GenerationError::new(GenerationErrorKind::Transport(format!(
                    "Rate limiter closed: {}",
                    e
                )))
            })?;

        Ok(RateLimiterGuard { _permit: permit })
    }

    /// Try to acquire without waiting.
    ///
    /// Returns `None` if any limit would block.
    pub fn try_acquire(&self) -> Option<RateLimiterGuard> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.check().ok()?;
        }
        let permit = self.concurrent_semaphore.clone().try_acquire_owned().ok()?;
        Some(RateLimiterGuard { _permit: permit })
    }
}

/// RAII guard releasing the concurrency slot on drop.
#[derive(Debug)]
pub struct RateLimiterGuard {
    _permit: tokio::sync::OwnedSemaphorePermit,
}
