//! Text-generation errors and retry classification.

/// Failure conditions reported by a text-generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GenerationErrorKind {
    /// Backend rejected the call for quota reasons (HTTP 429)
    #[display("Rate limited: {}", _0)]
    RateLimited(String),
    /// Backend failed on its side (HTTP 5xx)
    #[display("Server error {}: {}", status, message)]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },
    /// Credentials were rejected (HTTP 401/403)
    #[display("Authentication failed {}: {}", status, message)]
    AuthError {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },
    /// Request was malformed (other HTTP 4xx)
    #[display("Bad request {}: {}", status, message)]
    BadRequest {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },
    /// Response arrived but did not carry usable content
    #[display("Malformed response: {}", _0)]
    MalformedResponse(String),
    /// Connection, timeout or other transport failure
    #[display("Transport failure: {}", _0)]
    Transport(String),
    /// No API key is available for the backend
    #[display("No API credentials configured")]
    NoCredentials,
    /// The call was abandoned because the run was cancelled
    #[display("Generation cancelled")]
    Cancelled,
}

impl GenerationErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationErrorKind::RateLimited(_)
                | GenerationErrorKind::ServerError { .. }
                | GenerationErrorKind::Transport(_)
        )
    }

    /// Short label for log fields.
    pub fn label(&self) -> &'static str {
        match self {
            GenerationErrorKind::RateLimited(_) => "rate_limit",
            GenerationErrorKind::ServerError { .. } => "server",
            GenerationErrorKind::AuthError { .. } => "auth",
            GenerationErrorKind::BadRequest { .. } => "invalid_request",
            GenerationErrorKind::MalformedResponse(_) => "malformed",
            GenerationErrorKind::Transport(_) => "network",
            GenerationErrorKind::NoCredentials => "no_credentials",
            GenerationErrorKind::Cancelled => "cancelled",
        }
    }
}

/// Generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use storyboard_error::{GenerationError, GenerationErrorKind, RetryableError};
///
/// let err = GenerationError::new(GenerationErrorKind::RateLimited("quota".to_string()));
/// assert!(err.is_retryable());
///
/// let err = GenerationError::new(GenerationErrorKind::AuthError {
///     status: 401,
///     message: "bad key".to_string(),
/// });
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The kind of error that occurred
    pub kind: GenerationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Map an HTTP status code and body onto the matching error kind.
    #[track_caller]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = match status {
            429 => GenerationErrorKind::RateLimited(message),
            401 | 403 => GenerationErrorKind::AuthError { status, message },
            500..=599 => GenerationErrorKind::ServerError { status, message },
            _ => GenerationErrorKind::BadRequest { status, message },
        };
        Self::new(kind)
    }

    /// Whether the error is a cancellation rather than a backend failure.
    pub fn is_cancelled(&self) -> bool {
        self.kind == GenerationErrorKind::Cancelled
    }
}

/// Trait for errors that support retry logic.
///
/// Transient conditions (rate limits, server errors, dropped connections)
/// return true from `is_retryable`. Client errors such as bad requests or
/// rejected credentials return false and fail immediately.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for GenerationError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Result type for generation calls.
pub type GenerationResult<T> = Result<T, GenerationError>;
