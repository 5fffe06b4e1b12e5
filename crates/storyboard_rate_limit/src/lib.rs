//! Configuration, retry and throttling for Storyboard generation calls.
//!
//! - [`StoryboardConfig`] loads layered TOML configuration.
//! - [`RetryingGenerator`] wraps any `TextGenerator` with bounded exponential
//!   backoff, optional throttling and cancellation.
//! - [`RateLimiter`] enforces requests-per-minute and concurrency limits.
//! - [`CredentialPool`] and [`CredentialStrategy`] pick API keys without shared
//!   mutable state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod credentials;
mod limiter;
mod retry;

pub use config::{
    ExtractionConfig, GenerationConfig, LimitsConfig, PromptConfig, RetryConfig, SegmenterConfig,
    StoryboardConfig, ThemeConfig, ThrottleConfig,
};
pub use credentials::{CredentialPool, CredentialStrategy, FirstKey, RotateByAttempt};
pub use limiter::{RateLimiter, RateLimiterGuard};
pub use retry::{RetryPolicy, RetryingGenerator};
