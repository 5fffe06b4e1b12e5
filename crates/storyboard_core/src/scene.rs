//! Scene line type.

use serde::{Deserialize, Serialize};

/// Count whitespace-separated words.
///
/// # Examples
///
/// ```
/// use storyboard_core::word_count;
///
/// assert_eq!(word_count("Time stops.  The mug\nfalls."), 5);
/// assert_eq!(word_count("   "), 0);
/// ```
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// One bounded-length segment of a story, mapped to exactly one image prompt.
///
/// Lines are 1-indexed and their order equals narrative order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
pub struct SceneLine {
    /// 1-based position in the story
    index: usize,
    /// Line text
    text: String,
    /// Number of words in `text`
    word_count: usize,
}

impl SceneLine {
    /// Create a scene line, deriving its word count.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let word_count = word_count(&text);
        Self {
            index,
            text,
            word_count,
        }
    }

    /// Number the given texts from 1 in order.
    pub fn sequence<I, S>(texts: I) -> Vec<SceneLine>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| SceneLine::new(i + 1, text))
            .collect()
    }
}
