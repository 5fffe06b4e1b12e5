//! Scene segmentation, character extraction and prompt assembly.
//!
//! The pipeline turns a story into one image prompt per scene line:
//!
//! ```text
//! story -> TextSegmenter      -> scene lines
//! story -> CharacterExtractor -> character registry
//! (line, registry) -> CharacterResolver -> cast -> PromptAssembler -> prompt
//! ```
//!
//! Every stage that calls a [`TextGenerator`](storyboard_interface::TextGenerator)
//! degrades instead of failing: segmentation falls back to a deterministic
//! paragraph splitter, extraction to an empty registry and theme analysis to
//! fixed defaults.
//!
//! # Example
//!
//! ```
//! use storyboard_core::{Character, CharacterCategory};
//! use storyboard_pipeline::{build_prompt, resolve_cast_for_line};
//!
//! let michael = Character::builder()
//!     .name("Michael")
//!     .category(CharacterCategory::Main)
//!     .build()
//!     .unwrap();
//! let chloe = Character::builder().name("Chloe").build().unwrap();
//! let characters = vec![michael, chloe];
//!
//! let cast = resolve_cast_for_line("Michael picks up the phone", &characters);
//! assert_eq!(cast.len(), 1);
//!
//! let prompt = build_prompt("Flat colours.", &cast, "Michael picks up the phone");
//! assert!(prompt.starts_with("Flat colours."));
//! assert!(prompt.contains("Michael — "));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assembler;
mod candidate;
mod control;
mod dedup;
mod extraction;
mod extractor;
mod refiner;
mod resolver;
mod scene;
mod segmenter;
mod storyboard;
mod theme;

pub use assembler::{PromptAssembler, assemble, build_prompt, describe_character};
pub use candidate::{AppearanceCandidate, CharacterCandidate};
pub use control::RunControl;
pub use dedup::{dedupe_characters, dedupe_registry, match_keys, normalize_name};
pub use extraction::{extract_json, parse_json};
pub use extractor::{CharacterExtractor, extract_characters};
pub use refiner::PromptRefiner;
pub use resolver::{CharacterResolver, resolve_cast_for_line};
pub use scene::describe_scene;
pub use segmenter::{TextSegmenter, segment_story};
pub use storyboard::{PromptRun, StoryAnalysis, Storyboard};
pub use theme::{ThemeAnalyzer, analyze_theme};
