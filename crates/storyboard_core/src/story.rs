//! Validated story input.

use storyboard_error::{StoryError, StoryErrorKind};

/// Default upper bound on story length, in characters.
pub const DEFAULT_MAX_STORY_CHARS: usize = 120_000;

/// Raw story text that passed input validation.
///
/// The text is immutable once constructed; every pipeline stage borrows it.
///
/// # Examples
///
/// ```
/// use storyboard_core::StoryText;
///
/// let story = StoryText::new("Michael picks up the phone.", 1_000).unwrap();
/// assert_eq!(story.as_str(), "Michael picks up the phone.");
///
/// assert!(StoryText::new("   ", 1_000).is_err());
/// assert!(StoryText::new("too long", 3).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoryText(String);

impl StoryText {
    /// Validate raw text against emptiness and the character limit.
    ///
    /// # Errors
    ///
    /// Returns `EmptyStory` for blank input and `StoryTooLarge` when the text
    /// has more than `max_chars` characters.
    #[track_caller]
    pub fn new(text: impl Into<String>, max_chars: usize) -> Result<Self, StoryError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(StoryError::new(StoryErrorKind::EmptyStory));
        }
        let length = text.chars().count();
        if length > max_chars {
            return Err(StoryError::new(StoryErrorKind::StoryTooLarge {
                length,
                limit: max_chars,
            }));
        }
        Ok(Self(text))
    }

    /// Borrow the story text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StoryText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
