//! Error types for the Storyboard workspace.
//!
//! This crate provides the foundation error types used by every other Storyboard crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use storyboard_error::{StoryboardResult, StoryError, StoryErrorKind};
//!
//! fn load() -> StoryboardResult<String> {
//!     Err(StoryError::new(StoryErrorKind::EmptyStory))?
//! }
//!
//! assert!(load().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod generation;
mod json;
mod story;

pub use config::ConfigError;
pub use error::{StoryboardError, StoryboardErrorKind, StoryboardResult};
pub use generation::{GenerationError, GenerationErrorKind, GenerationResult, RetryableError};
pub use json::{JsonError, PREVIEW_CHARS};
pub use story::{StoryError, StoryErrorKind};
