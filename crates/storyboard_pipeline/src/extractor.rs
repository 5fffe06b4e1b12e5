//! Character extraction.

use crate::{CharacterCandidate, dedupe_characters, extract_json, parse_json};
use serde_json::Value;
use storyboard_core::{CharacterRegistry, GenerateRequest, StoryText, ThemeProfile};
use storyboard_interface::TextGenerator;
use storyboard_rate_limit::ExtractionConfig;
use tracing::{debug, info, instrument, warn};

/// Finds every human character in a story and builds the registry.
///
/// One structured call asks the model to list named people, resolve pronouns
/// and role references ("the doctor") to entities, synthesize names for
/// unnamed people and describe each one's appearance. The result is repaired
/// and deduplicated locally.
#[derive(Debug, Clone, Default, derive_getters::Getters)]
pub struct CharacterExtractor {
    config: ExtractionConfig,
}

impl CharacterExtractor {
    /// Create an extractor.
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract and deduplicate characters.
    ///
    /// Returns an empty registry when the call fails or its output does not
    /// parse; this is a degraded result, not an error.
    #[instrument(skip_all, fields(story_chars = story.as_str().len(), provider = generator.provider_name()))]
    pub async fn extract<G>(
        &self,
        generator: &G,
        story: &StoryText,
        theme: Option<&ThemeProfile>,
    ) -> CharacterRegistry
    where
        G: TextGenerator + ?Sized,
    {
        let request = GenerateRequest::from_prompt(
            self.instruction(story.as_str(), theme),
            self.config.temperature,
            self.config.max_tokens,
        );

        let response = match generator.generate(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Character extraction call failed, no characters detected");
                return CharacterRegistry::empty();
            }
        };

        let Some(candidates) = Self::parse_response(&response) else {
            warn!("Character extraction output unusable, no characters detected");
            return CharacterRegistry::empty();
        };

        let found = candidates.len();
        let registry = dedupe_characters(candidates);
        let counts = registry.counts();
        info!(
            candidates = found,
            main = counts.main,
            side = counts.side,
            "Extracted characters"
        );
        registry
    }

    /// Instruction sent to the model.
    pub fn instruction(&self, story: &str, theme: Option<&ThemeProfile>) -> String {
        let era = theme.map(|t| t.era.as_str()).unwrap_or("Modern Day");
        let genre = theme.map(|t| t.genre.as_str()).unwrap_or("Drama");
        format!(
            r##"Identify EVERY human character in the story for a consistent animated storyboard.

Work in four passes over the text:
1. Every proper name.
2. Every pronoun: attach it to the person it refers to; if no named antecedent exists, create a person with a realistic synthesized name.
3. Every occupation or role reference ("the doctor", "a guard") not already covered.
4. Every implied or possessive reference ("his wife", "Michael's boss").

Rules:
- One entry per person. Put every surface form that refers to them (nicknames, relationship and role terms) in "aliases".
- Synthesized names must suit the era ({era}) and genre ({genre}); set "isGenerated": true for them.
- "category" is "main" for people who are named and recur or drive the story, otherwise "side".
- Fill EVERY appearance field. Ages are integers; colours are "#RRGGBB".

Return ONLY JSON in this shape:
{{"characters": [
  {{
    "name": "string",
    "category": "main|side",
    "aliases": ["string"],
    "isGenerated": false,
    "appearance": {{
      "face": "shape, jaw, cheekbones",
      "eyes": {{"shape": "string", "hex": "#RRGGBB"}},
      "hair": {{"style": "length, texture, style", "hex": "#RRGGBB"}},
      "skin": {{"hex": "#RRGGBB"}},
      "body": {{"age": 30, "height_cm": 170, "build": "string"}},
      "mark": "one permanent distinguishing mark and its location",
      "accessory": "one signature accessory",
      "outfit": "permanent clothing and colours",
      "defaults": {{"expression": "neutral|happy|concerned|angry"}}
    }}
  }}
]}}

STORY:
{story}"##,
            era = era,
            genre = genre,
            story = story,
        )
    }

    /// Parse candidates from a response.
    ///
    /// Accepts `{"characters": [...]}` or a bare array. Entries that do not
    /// deserialize are skipped; `None` means no candidate list was found.
    pub fn parse_response(response: &str) -> Option<Vec<CharacterCandidate>> {
        let json = extract_json(response)
            .map_err(|e| debug!(error = %e, "No JSON in extraction response"))
            .ok()?;
        let value: Value = parse_json(&json)
            .map_err(|e| debug!(error = %e, "Extraction response is not JSON"))
            .ok()?;

        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("characters") {
                Some(Value::Array(items)) => items,
                _ => return None,
            },
            _ => return None,
        };

        Some(
            items
                .into_iter()
                .filter_map(|item| {
                    serde_json::from_value::<CharacterCandidate>(item)
                        .map_err(|e| debug!(error = %e, "Skipping malformed character entry"))
                        .ok()
                })
                .collect(),
        )
    }
}

/// Extract characters with default settings.
///
/// Never fails; see [`CharacterExtractor::extract`].
pub async fn extract_characters<G>(
    generator: &G,
    story: &StoryText,
    theme: Option<&ThemeProfile>,
) -> CharacterRegistry
where
    G: TextGenerator + ?Sized,
{
    CharacterExtractor::default()
        .extract(generator, story, theme)
        .await
}
