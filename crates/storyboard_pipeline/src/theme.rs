//! Story theme analysis.

use crate::{extract_json, parse_json};
use serde_json::{Map, Value};
use storyboard_core::{GenerateRequest, StoryText, ThemeProfile};
use storyboard_interface::TextGenerator;
use storyboard_rate_limit::ThemeConfig;
use tracing::{debug, info, instrument, warn};

/// Classifies a story's theme, tone, genre and era.
#[derive(Debug, Clone, Default, derive_getters::Getters)]
pub struct ThemeAnalyzer {
    config: ThemeConfig,
}

impl ThemeAnalyzer {
    /// Create an analyzer.
    pub fn new(config: ThemeConfig) -> Self {
        Self { config }
    }

    /// Classify a story.
    ///
    /// Missing or blank fields take their defaults individually; a failed call
    /// yields [`ThemeProfile::default`].
    #[instrument(skip_all, fields(story_chars = story.as_str().len(), provider = generator.provider_name()))]
    pub async fn analyze<G>(&self, generator: &G, story: &StoryText) -> ThemeProfile
    where
        G: TextGenerator + ?Sized,
    {
        let request = GenerateRequest::from_prompt(
            Self::instruction(story.as_str()),
            self.config.temperature,
            self.config.max_tokens,
        );

        match generator.generate(&request).await {
            Ok(response) => {
                let theme = Self::parse_response(&response);
                info!(genre = %theme.genre, era = %theme.era, "Analyzed story theme");
                theme
            }
            Err(e) => {
                warn!(error = %e, "Theme analysis failed, using defaults");
                ThemeProfile::default()
            }
        }
    }

    /// Instruction sent to the model.
    pub fn instruction(story: &str) -> String {
        format!(
            "Analyze this story and return compact JSON: \
             {{\"theme\":\"...\", \"tone\":\"...\", \"genre\":\"...\", \"era\":\"...\"}}.\n\n\
             Story:\n{}",
            story
        )
    }

    /// Read a profile from a response, defaulting field by field.
    pub fn parse_response(response: &str) -> ThemeProfile {
        let fields = extract_json(response)
            .ok()
            .and_then(|json| parse_json::<Map<String, Value>>(&json).ok());

        let Some(fields) = fields else {
            warn!("Theme response is not a JSON object, using defaults");
            return ThemeProfile::default();
        };

        let field = |key: &str, default: String| match fields.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => {
                debug!(field = key, "Theme field missing, using default");
                default
            }
        };

        let defaults = ThemeProfile::default();
        ThemeProfile {
            theme: field("theme", defaults.theme),
            tone: field("tone", defaults.tone),
            genre: field("genre", defaults.genre),
            era: field("era", defaults.era),
        }
    }
}

/// Classify a story with default settings. Never fails.
pub async fn analyze_theme<G>(generator: &G, story: &StoryText) -> ThemeProfile
where
    G: TextGenerator + ?Sized,
{
    ThemeAnalyzer::default().analyze(generator, story).await
}
