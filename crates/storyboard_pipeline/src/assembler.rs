//! Prompt assembly.

use crate::describe_scene;
use storyboard_core::{ANTI_TEXT_TAIL, Character, STYLE_LOCK};
use storyboard_rate_limit::PromptConfig;

/// One-line visual description of a character.
///
/// # Examples
///
/// ```
/// use storyboard_core::Character;
/// use storyboard_pipeline::describe_character;
///
/// let rachel = Character::builder().name("Rachel").build().unwrap();
/// let block = describe_character(&rachel);
/// assert!(block.starts_with("Rachel — "));
/// assert!(block.contains("; body 30y "));
/// ```
pub fn describe_character(character: &Character) -> String {
    let a = character.appearance();
    format!(
        "{} — {}; eyes {} {}; hair {} {}; skin {}; body {}y {}cm {}; mark: {}; accessory: {}; outfit: {}; expression: {}",
        character.name(),
        a.face,
        a.eyes.shape,
        a.eyes.hex,
        a.hair.style,
        a.hair.hex,
        a.skin.hex,
        a.body.age,
        a.body.height_cm,
        a.body.build,
        a.mark,
        a.accessory,
        a.outfit,
        a.defaults.expression,
    )
}

/// Join style, cast block, scene description and closing clause.
///
/// The cast block is the character descriptions joined by `" | "` and is
/// omitted when the cast is empty. Blank sections are skipped.
pub fn assemble<'a, I>(style: &str, cast: I, scene_description: &str, anti_text_tail: &str) -> String
where
    I: IntoIterator<Item = &'a Character>,
{
    let cast_block = cast
        .into_iter()
        .map(describe_character)
        .collect::<Vec<_>>()
        .join(" | ");

    [style, cast_block.as_str(), scene_description, anti_text_tail]
        .into_iter()
        .map(str::trim)
        .filter(|section| !section.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the prompt for one scene line with the default closing clause.
pub fn build_prompt(style: &str, cast: &[Character], scene_line: &str) -> String {
    assemble(style, cast, &describe_scene(scene_line), ANTI_TEXT_TAIL)
}

/// Assembles prompts with a configured style and closing clause.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct PromptAssembler {
    style: String,
    anti_text_tail: String,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(STYLE_LOCK, ANTI_TEXT_TAIL)
    }
}

impl From<&PromptConfig> for PromptAssembler {
    fn from(config: &PromptConfig) -> Self {
        Self::new(&config.style_lock, &config.anti_text_tail)
    }
}

impl PromptAssembler {
    /// Create an assembler.
    pub fn new(style: impl Into<String>, anti_text_tail: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            anti_text_tail: anti_text_tail.into(),
        }
    }

    /// Copy with a different style block.
    pub fn with_style(self, style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            ..self
        }
    }

    /// Prompt for a scene line and its resolved cast.
    pub fn prompt_for<'a, I>(&self, cast: I, scene_line: &str) -> String
    where
        I: IntoIterator<Item = &'a Character>,
    {
        assemble(
            &self.style,
            cast,
            &describe_scene(scene_line),
            &self.anti_text_tail,
        )
    }
}
