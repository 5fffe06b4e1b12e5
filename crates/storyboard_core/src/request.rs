//! Generation request type.

use crate::{Message, Role};
use serde::{Deserialize, Serialize};

/// A text-generation request handed to a `TextGenerator`.
///
/// `attempt` is the zero-based retry ordinal. The retry layer sets it before
/// each attempt so backends can pick credentials without shared state.
///
/// # Examples
///
/// ```
/// use storyboard_core::GenerateRequest;
///
/// let request = GenerateRequest::from_prompt("Return JSON", 0.2, 300);
///
/// assert_eq!(request.messages.len(), 1);
/// assert_eq!(request.max_tokens, Some(300));
/// assert_eq!(request.attempt, 0);
/// ```
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Default, derive_builder::Builder,
)]
#[builder(setter(into), default)]
pub struct GenerateRequest {
    /// The conversation messages to send
    pub messages: Vec<Message>,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 to 1.0)
    pub temperature: Option<f32>,
    /// Model identifier override
    pub model: Option<String>,
    /// Zero-based attempt ordinal
    #[serde(default)]
    pub attempt: u32,
}

impl GenerateRequest {
    /// Create a builder for a request.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }

    /// Single user-message request with sampling parameters.
    pub fn from_prompt(prompt: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            messages: vec![Message::new(Role::User, prompt)],
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
            model: None,
            attempt: 0,
        }
    }

    /// Copy of this request tagged with a different attempt ordinal.
    pub fn with_attempt(&self, attempt: u32) -> Self {
        Self {
            attempt,
            ..self.clone()
        }
    }

    /// Concatenated text of all user messages.
    pub fn user_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
