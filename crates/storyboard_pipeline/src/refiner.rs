//! Optional model rewrite of assembled prompts.

use storyboard_core::{Character, GenerateRequest, Message, PromptLength, Role};
use storyboard_interface::TextGenerator;
use tracing::{debug, instrument, warn};

/// Asks the generator to tighten an assembled prompt to a preset length.
///
/// The deterministic prompt stays authoritative: any failure, or an empty
/// rewrite, returns it unchanged.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct PromptRefiner {
    length: PromptLength,
    temperature: f32,
    max_tokens: u32,
}

impl Default for PromptRefiner {
    fn default() -> Self {
        Self::new(PromptLength::default())
    }
}

impl PromptRefiner {
    /// Refiner targeting `length`.
    pub fn new(length: PromptLength) -> Self {
        Self {
            length,
            temperature: 0.7,
            max_tokens: 1500,
        }
    }

    /// System instruction wrapping the assembled prompt.
    ///
    /// Each character in `cast` is listed with its appearance summary so the
    /// rewrite cannot drift from the locked look.
    pub fn instruction(&self, prompt: &str, cast: &[&Character]) -> String {
        let mut text = format!(
            "You write prompts for an image generator. Rewrite the reference prompt below \
             for the user's scene line in {length}.\n\
             Rules:\n\
             - Start with the style phrase exactly as given.\n\
             - Keep every character's appearance details unchanged.\n\
             - Describe only visible action, setting and framing.\n\
             - Never ask for readable text, signs, captions or speech bubbles.\n\
             - Return only the prompt, no commentary.\n\n\
             REFERENCE PROMPT:\n{prompt}",
            length = self.length.describe(),
            prompt = prompt,
        );
        if !cast.is_empty() {
            text.push_str("\n\nCHARACTERS:");
            for character in cast {
                text.push_str(&format!(
                    "\n- {}: {}",
                    character.name(),
                    character.appearance().summary()
                ));
            }
        }
        text
    }

    /// Rewrite `prompt` for `scene_line`, featuring `cast`.
    ///
    /// Returns the text and whether it was rewritten.
    #[instrument(skip_all, fields(length = %self.length, cast = cast.len(), provider = generator.provider_name()))]
    pub async fn refine<G>(
        &self,
        generator: &G,
        prompt: &str,
        scene_line: &str,
        cast: &[&Character],
    ) -> (String, bool)
    where
        G: TextGenerator + ?Sized,
    {
        let request = GenerateRequest {
            messages: vec![
                Message::new(Role::System, self.instruction(prompt, cast)),
                Message::new(Role::User, scene_line),
            ],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            ..Default::default()
        };

        match generator.generate(&request).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!(words = text.split_whitespace().count(), "Refined prompt");
                (text.trim().to_string(), true)
            }
            Ok(_) => {
                warn!("Refiner returned empty text, keeping assembled prompt");
                (prompt.to_string(), false)
            }
            Err(e) => {
                warn!(error = %e, "Prompt refinement failed, keeping assembled prompt");
                (prompt.to_string(), false)
            }
        }
    }
}
