//! Errors for model responses that should have carried JSON.

/// Characters of the offending response kept for diagnostics.
pub const PREVIEW_CHARS: usize = 100;

/// A model response held no JSON, or JSON of the wrong shape.
///
/// # Examples
///
/// ```
/// use storyboard_error::JsonError;
///
/// let err = JsonError::new("expected an array").with_preview("Sure! Here you go");
/// assert_eq!(err.preview, "Sure! Here you go");
/// assert!(err.to_string().contains("expected an array"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} (response: {:?}) at line {} in {}", message, preview, line, file)]
pub struct JsonError {
    /// What was wrong with the payload
    pub message: String,
    /// Leading characters of the response
    pub preview: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Create an error with an empty preview.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            preview: String::new(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Attach the first [`PREVIEW_CHARS`] characters of `response`.
    pub fn with_preview(mut self, response: &str) -> Self {
        self.preview = response.chars().take(PREVIEW_CHARS).collect();
        self
    }
}
