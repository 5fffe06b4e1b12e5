//! Per-line cast resolution.

use storyboard_core::Character;
use tracing::trace;

fn mentioned_in(lowercase_line: &str, character: &Character) -> bool {
    character
        .surface_forms()
        .map(str::trim)
        .filter(|form| !form.is_empty())
        .any(|form| lowercase_line.contains(&form.to_lowercase()))
}

/// Decides which characters appear in a scene line.
///
/// Matching is a case-insensitive substring test of the line against each
/// character's name and aliases. Pronoun resolution already happened during
/// extraction, so a line that names nobody falls back to every main
/// character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters)]
pub struct CharacterResolver {
    max_side: usize,
}

impl Default for CharacterResolver {
    fn default() -> Self {
        Self { max_side: 3 }
    }
}

impl CharacterResolver {
    /// Resolver keeping at most `max_side` matched side characters per line.
    pub fn new(max_side: usize) -> Self {
        Self { max_side }
    }

    /// Whether `line` mentions the character by name or alias.
    pub fn mentions(line: &str, character: &Character) -> bool {
        mentioned_in(&line.to_lowercase(), character)
    }

    /// Cast for a line, in registry order with mains first.
    ///
    /// All matched mains are kept, then the first `max_side` matched sides.
    /// With no match at all the cast is every main character.
    pub fn resolve<'a>(&self, line: &str, characters: &'a [Character]) -> Vec<&'a Character> {
        let haystack = line.to_lowercase();
        let matched: Vec<&Character> = characters
            .iter()
            .filter(|c| mentioned_in(&haystack, c))
            .collect();

        if matched.is_empty() {
            trace!("No lexical match, defaulting to main characters");
            return characters.iter().filter(|c| c.is_main()).collect();
        }

        let mains = matched.iter().copied().filter(|c| c.is_main());
        let sides = matched
            .iter()
            .copied()
            .filter(|c| !c.is_main())
            .take(self.max_side);
        mains.chain(sides).collect()
    }
}

/// Resolve the cast of a line with the default side limit.
///
/// Pure and synchronous; never fails.
pub fn resolve_cast_for_line(line: &str, characters: &[Character]) -> Vec<Character> {
    CharacterResolver::default()
        .resolve(line, characters)
        .into_iter()
        .cloned()
        .collect()
}
