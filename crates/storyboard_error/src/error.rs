//! Top-level error wrapper types.

use crate::{ConfigError, GenerationError, JsonError, StoryError};

/// Every error condition the Storyboard crates can surface.
///
/// # Examples
///
/// ```
/// use storyboard_error::{StoryboardError, ConfigError};
///
/// let err: StoryboardError = ConfigError::new("bad window").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StoryboardErrorKind {
    /// Story input validation error
    #[from(StoryError)]
    Story(StoryError),
    /// Text-generation backend error
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Model response carried no usable JSON
    #[from(JsonError)]
    Json(JsonError),
}

/// Storyboard error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storyboard Error: {}", _0)]
pub struct StoryboardError(Box<StoryboardErrorKind>);

impl StoryboardError {
    /// Create a new error from a kind.
    pub fn new(kind: StoryboardErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryboardErrorKind {
        &self.0
    }
}

impl<T> From<T> for StoryboardError
where
    T: Into<StoryboardErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Storyboard operations.
pub type StoryboardResult<T> = std::result::Result<T, StoryboardError>;
