//! Deduplicated character registry.

use crate::Character;
use serde::{Deserialize, Serialize};

/// Number of characters per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastCounts {
    /// Main characters
    pub main: usize,
    /// Side characters
    pub side: usize,
    /// All characters
    pub total: usize,
}

/// The sorted, read-only set of characters for one story.
///
/// Characters are ordered alphabetically by name (case-insensitive). Ties are
/// broken by the exact name, then main before side, then the alias list, so
/// the order never depends on extraction order.
///
/// # Examples
///
/// ```
/// use storyboard_core::{Character, CharacterCategory, CharacterRegistry};
///
/// let registry = CharacterRegistry::new(vec![
///     Character::builder().name("zoe").build().unwrap(),
///     Character::builder().name("Adam").category(CharacterCategory::Main).build().unwrap(),
/// ]);
///
/// let names: Vec<_> = registry.iter().map(|c| c.name().as_str()).collect();
/// assert_eq!(names, vec!["Adam", "zoe"]);
/// assert_eq!(registry.counts().main, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Character>", into = "Vec<Character>")]
pub struct CharacterRegistry {
    characters: Vec<Character>,
}

impl CharacterRegistry {
    /// Build a registry, sorting the characters.
    pub fn new(mut characters: Vec<Character>) -> Self {
        characters.sort_by(|a, b| {
            a.name()
                .to_lowercase()
                .cmp(&b.name().to_lowercase())
                .then_with(|| a.name().cmp(b.name()))
                .then_with(|| a.category().cmp(b.category()))
                .then_with(|| a.aliases().cmp(b.aliases()))
        });
        Self { characters }
    }

    /// Registry with no characters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Iterate characters in registry order.
    pub fn iter(&self) -> std::slice::Iter<'_, Character> {
        self.characters.iter()
    }

    /// Characters as a slice.
    pub fn as_slice(&self) -> &[Character] {
        &self.characters
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// True when no characters were found.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Main characters in registry order.
    pub fn mains(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter().filter(|c| c.is_main())
    }

    /// Per-category totals.
    pub fn counts(&self) -> CastCounts {
        let main = self.mains().count();
        CastCounts {
            main,
            side: self.characters.len() - main,
            total: self.characters.len(),
        }
    }
}

impl From<Vec<Character>> for CharacterRegistry {
    fn from(characters: Vec<Character>) -> Self {
        Self::new(characters)
    }
}

impl From<CharacterRegistry> for Vec<Character> {
    fn from(registry: CharacterRegistry) -> Self {
        registry.characters
    }
}

impl<'a> IntoIterator for &'a CharacterRegistry {
    type Item = &'a Character;
    type IntoIter = std::slice::Iter<'a, Character>;

    fn into_iter(self) -> Self::IntoIter {
        self.characters.iter()
    }
}
