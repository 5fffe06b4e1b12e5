//! Storyboard: turn a story script into one image-generation prompt per scene
//! line, with consistent character appearances across the sequence.
//!
//! # Pipeline
//!
//! 1. **Segmentation** splits the story into scene lines of 8-25 words.
//! 2. **Extraction** finds every human character, named or implied, and gives
//!    each a fully populated appearance record.
//! 3. **Resolution** picks the characters present in each line.
//! 4. **Assembly** joins a fixed style block, the cast descriptions and a scene
//!    description into the final prompt.
//!
//! Generation failures never abort a run: segmentation falls back to a
//! deterministic splitter and extraction to an empty registry.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use storyboard::{
//!     OpenAICompatibleClient, RetryPolicy, RetryingGenerator, RunControl, Storyboard,
//!     StoryboardConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoryboardConfig::load()?;
//!     let client = OpenAICompatibleClient::from_config(&config.generation)?;
//!     let generator = RetryingGenerator::new(client, RetryPolicy::from(&config.retry));
//!
//!     let storyboard = Storyboard::new(generator, config);
//!     let analysis = storyboard.analyze("Michael picks up the phone. ...").await?;
//!     let run = storyboard.generate_prompts(&analysis, &RunControl::default()).await;
//!
//!     for prompt in run.prompts {
//!         println!("{}: {}", prompt.index, prompt.prompt);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `storyboard_error` - Error types
//! - `storyboard_core` - Data model (scene lines, characters, registry)
//! - `storyboard_interface` - `TextGenerator` trait and cancellation token
//! - `storyboard_rate_limit` - Configuration, retry and throttling
//! - `storyboard_models` - Chat-completions and offline backends
//! - `storyboard_pipeline` - Segmentation, extraction, resolution and assembly
//!
//! This crate re-exports everything for convenience and ships the
//! `storyboard` command-line tool.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
mod observability;

pub use observability::{
    ObservabilityConfig, VERBOSE_FILTER, init_observability, init_observability_with_config,
};

pub use storyboard_core::*;
pub use storyboard_error::*;
pub use storyboard_interface::*;
pub use storyboard_models::*;
pub use storyboard_pipeline::*;
pub use storyboard_rate_limit::*;
