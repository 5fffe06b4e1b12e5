//! Core data types for the Storyboard pipeline.
//!
//! This crate provides the data model shared by every stage: validated story
//! text, scene lines, deduplicated characters with their visual identity
//! records, the theme profile, generated prompts and generation requests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod character;
mod message;
mod prompt;
mod registry;
mod request;
mod role;
mod scene;
mod story;
mod theme;

pub use character::{
    Appearance, BodyDna, Character, CharacterBuilder, CharacterBuilderError, CharacterCategory,
    DefaultsDna, EyesDna, HairDna, SkinDna,
};
pub use message::{Message, MessageBuilder};
pub use prompt::{ANTI_TEXT_TAIL, GeneratedPrompt, PromptLength, STYLE_LOCK};
pub use registry::{CastCounts, CharacterRegistry};
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateRequestBuilderError};
pub use role::Role;
pub use scene::{SceneLine, word_count};
pub use story::{DEFAULT_MAX_STORY_CHARS, StoryText};
pub use theme::ThemeProfile;
