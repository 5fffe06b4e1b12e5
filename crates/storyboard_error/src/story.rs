//! Story input validation errors.

/// Specific reasons a story text is rejected before processing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoryErrorKind {
    /// Story text is empty or whitespace only
    #[display("Story text is empty")]
    EmptyStory,
    /// Story text exceeds the configured character limit
    #[display("Story text too large: {} characters (limit {})", length, limit)]
    StoryTooLarge {
        /// Length of the rejected story in characters
        length: usize,
        /// Configured limit in characters
        limit: usize,
    },
}

/// Error raised when a story fails input validation.
///
/// # Examples
///
/// ```
/// use storyboard_error::{StoryError, StoryErrorKind};
///
/// let err = StoryError::new(StoryErrorKind::StoryTooLarge { length: 10, limit: 5 });
/// assert!(format!("{}", err).contains("limit 5"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Story Error: {} at line {} in {}", kind, line, file)]
pub struct StoryError {
    /// The specific error condition
    pub kind: StoryErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl StoryError {
    /// Create a new StoryError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
