//! Prompt output types.

use serde::{Deserialize, Serialize};

/// Fixed visual style prepended to every prompt.
pub const STYLE_LOCK: &str = "Semi-realistic 90s 2D cel animation aesthetic, bold black ink outlines exactly 3px thick, hand-painted cel shading with 2-3 flat color layers per object, matte finish, Batman: The Animated Series color palette (deep shadows #1A1A2E, vibrant reds #C1272D, blues #0077BE, yellows #FFD700), analog film grain texture at 15% opacity, 16:9 aspect ratio, rule of thirds composition, diffused studio lighting from 45-degree angle top-left, classic 90s cartoon proportions, dynamic elements like motion lines or tension lines, NO TEXT OR CAPTIONS, pure visual scene with zero typography, no letters, no words, no written language, no signs, no labels, no captions, no subtitles, no speech bubbles, no quotes, blank surfaces only.";

/// Closing clause appended to every prompt to suppress rendered text.
pub const ANTI_TEXT_TAIL: &str = "pure visual scene with zero typography, no letters, no words, no written language, no signs, no labels, no captions, no subtitles, no speech bubbles, no quotes, blank surfaces only, focus only on character actions and environment visuals.";

/// Target length presets for LLM-refined prompts.
///
/// # Examples
///
/// ```
/// use storyboard_core::PromptLength;
/// use std::str::FromStr;
///
/// let length = PromptLength::from_str("detailed").unwrap();
/// assert_eq!(length.word_range(), (50, 75));
/// assert_eq!(PromptLength::default(), PromptLength::Balanced);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PromptLength {
    /// 15-25 words
    Quick,
    /// 25-50 words
    #[default]
    Balanced,
    /// 50-75 words
    Detailed,
    /// 75-100 words
    Extended,
    /// 100-150 words
    Comprehensive,
}

impl PromptLength {
    /// Inclusive word range for this preset.
    pub fn word_range(&self) -> (u32, u32) {
        match self {
            PromptLength::Quick => (15, 25),
            PromptLength::Balanced => (25, 50),
            PromptLength::Detailed => (50, 75),
            PromptLength::Extended => (75, 100),
            PromptLength::Comprehensive => (100, 150),
        }
    }

    /// Human readable range, e.g. `25-50 words`.
    pub fn describe(&self) -> String {
        let (min, max) = self.word_range();
        format!("{}-{} words", min, max)
    }
}

/// Final generation-ready prompt for one scene line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPrompt {
    /// 1-based scene line index
    pub index: usize,
    /// Scene line text
    pub line: String,
    /// Prompt text
    pub prompt: String,
    /// Names of the characters rendered in the prompt
    pub cast: Vec<String>,
    /// Whether the prompt was rewritten by the refiner
    #[serde(default)]
    pub refined: bool,
}
