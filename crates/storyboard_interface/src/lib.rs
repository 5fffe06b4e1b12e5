//! Trait definitions for Storyboard text-generation backends.
//!
//! The pipeline never talks to a network directly. It consumes a
//! [`TextGenerator`], and cooperates with callers through a [`CancelToken`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cancel;
mod traits;

pub use cancel::CancelToken;
pub use traits::TextGenerator;
