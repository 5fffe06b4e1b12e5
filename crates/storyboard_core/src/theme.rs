//! Story theme classification.

use serde::{Deserialize, Serialize};

/// Free-text classification of a story.
///
/// Only used as a hint for age and name inference during extraction.
///
/// # Examples
///
/// ```
/// use storyboard_core::ThemeProfile;
///
/// let theme = ThemeProfile::default();
/// assert_eq!(theme.era, "Modern Day");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThemeProfile {
    /// Central theme
    pub theme: String,
    /// Emotional tone
    pub tone: String,
    /// Genre label
    pub genre: String,
    /// Historical period or setting era
    pub era: String,
}

impl Default for ThemeProfile {
    fn default() -> Self {
        Self {
            theme: "Drama".to_string(),
            tone: "Emotional, Tense".to_string(),
            genre: "Drama".to_string(),
            era: "Modern Day".to_string(),
        }
    }
}
