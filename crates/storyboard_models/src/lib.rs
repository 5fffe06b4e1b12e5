//! Text-generation backends for Storyboard.
//!
//! - [`OpenAICompatibleClient`] talks to any chat-completions endpoint
//!   (LongCat by default) with stateless per-attempt key selection.
//! - [`OfflineGenerator`] fails every call, forcing the pipeline onto its
//!   deterministic fallbacks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod offline;
mod openai_compat;

pub use offline::OfflineGenerator;
pub use openai_compat::{
    ChatChoice, ChatMessage, ChatRequest, ChatRequestBuilder, ChatResponse, OpenAICompatibleClient,
    strip_code_fences,
};
