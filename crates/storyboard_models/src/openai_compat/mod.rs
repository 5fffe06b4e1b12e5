//! OpenAI-compatible chat-completions backend.

mod client;
mod dto;

pub use client::{OpenAICompatibleClient, strip_code_fences};
pub use dto::{ChatChoice, ChatMessage, ChatRequest, ChatRequestBuilder, ChatResponse};
