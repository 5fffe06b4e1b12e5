//! Identity deduplication.
//!
//! Candidates are folded greedily in input order. Each candidate carries a
//! key set: its normalized name, every word of that name and every normalized
//! alias. A candidate whose keys intersect an existing entity is merged into
//! it; when it intersects several entities, they are all folded into the
//! earliest one, so no two surviving entities ever share a key.
//!
//! Single-word keys make the merge transitive. Two different people sharing
//! a first or last name ("Mrs. Smith", "John Smith") collapse into one entity;
//! text alone carries no stronger signal to tell them apart.

use crate::CharacterCandidate;
use crate::candidate::AppearanceCandidate;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use storyboard_core::{Character, CharacterCategory, CharacterRegistry};
use tracing::{debug, warn};

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(dr|mr|mrs|ms)\.?\s+").expect("Valid title regex"));
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("Valid punctuation regex"));

/// Canonical form used for identity matching.
///
/// Lower-cases, strips one leading title (`dr`, `mr`, `mrs`, `ms`), removes
/// punctuation and collapses whitespace.
///
/// # Examples
///
/// ```
/// use storyboard_pipeline::normalize_name;
///
/// assert_eq!(normalize_name("Dr. Emmett  Brown"), "emmett brown");
/// assert_eq!(normalize_name("MRS O'Hara"), "ohara");
/// assert_eq!(normalize_name("his wife"), "his wife");
/// ```
pub fn normalize_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let untitled = TITLE.replace(&lower, "");
    let bare = PUNCTUATION.replace_all(&untitled, "");
    bare.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Match keys for a name and its aliases.
///
/// Empty when the name normalizes to nothing; such candidates are dropped.
pub fn match_keys<'a, I>(name: &str, aliases: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let base = normalize_name(name);
    if base.is_empty() {
        return BTreeSet::new();
    }

    let mut keys: BTreeSet<String> = base.split(' ').map(str::to_string).collect();
    keys.insert(base);
    keys.extend(
        aliases
            .into_iter()
            .map(normalize_name)
            .filter(|alias| !alias.is_empty()),
    );
    keys
}

#[derive(Debug)]
struct Entity {
    id: Option<String>,
    name: String,
    is_generated: bool,
    category: CharacterCategory,
    aliases: BTreeSet<String>,
    appearance: AppearanceCandidate,
    keys: BTreeSet<String>,
}

impl Entity {
    fn from_candidate(candidate: CharacterCandidate) -> Option<Self> {
        let name = candidate.display_name()?.to_string();
        let keys = match_keys(&name, candidate.aliases.iter().map(String::as_str));
        if keys.is_empty() {
            return None;
        }

        let category = candidate.category();
        let is_generated = candidate.is_generated();
        Some(Self {
            id: candidate.id,
            name,
            is_generated,
            category,
            aliases: candidate
                .aliases
                .iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !normalize_name(a).is_empty())
                .collect(),
            appearance: candidate.appearance,
            keys,
        })
    }

    fn absorb(&mut self, other: Entity) {
        debug!(into = %self.name, from = %other.name, "Merging character mentions");

        self.aliases.extend(other.aliases);
        if other.category.is_main() {
            self.category = CharacterCategory::Main;
        }
        // A synthesized name that loses to a verbatim one stays as an alias.
        if self.is_generated && !other.is_generated {
            let synthesized = std::mem::replace(&mut self.name, other.name);
            self.aliases.insert(synthesized);
            self.is_generated = false;
        } else if other.is_generated && !self.is_generated {
            self.aliases.insert(other.name);
        }
        self.appearance.merge(&other.appearance);
        self.keys.extend(other.keys);
        if self.id.is_none() {
            self.id = other.id;
        }
    }

    fn into_character(self) -> Option<Character> {
        let mut builder = Character::builder();
        builder
            .name(self.name)
            .category(self.category)
            .aliases(self.aliases)
            .is_generated(self.is_generated)
            .appearance(self.appearance.resolve());
        if let Some(id) = self.id {
            builder.id(id);
        }

        builder
            .build()
            .map_err(|e| warn!(error = %e, "Dropping invalid character"))
            .ok()
    }
}

/// Merge candidates into one character per person.
///
/// On merge, alias sets are unioned and the category escalates to main if any
/// source is main. A synthesized name is replaced by the first verbatim name
/// and kept as an alias. Appearance leaves present in the later source
/// override earlier ones. Candidates without a usable name are dropped, as are
/// aliases that normalize to nothing.
pub fn dedupe_characters<I>(candidates: I) -> CharacterRegistry
where
    I: IntoIterator<Item = CharacterCandidate>,
{
    let mut entities: Vec<Entity> = Vec::new();
    let mut dropped = 0usize;

    for candidate in candidates {
        let Some(incoming) = Entity::from_candidate(candidate) else {
            dropped += 1;
            continue;
        };

        let hits: Vec<usize> = entities
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.keys.is_disjoint(&incoming.keys))
            .map(|(i, _)| i)
            .collect();

        match hits.split_first() {
            None => entities.push(incoming),
            Some((&first, rest)) => {
                // Remove from the back so earlier indices stay valid, then fold in seen order.
                let folded: Vec<Entity> = rest.iter().rev().map(|&i| entities.remove(i)).collect();
                for entity in folded.into_iter().rev() {
                    entities[first].absorb(entity);
                }
                entities[first].absorb(incoming);
            }
        }
    }

    if dropped > 0 {
        debug!(dropped, "Skipped candidates without a usable name");
    }

    CharacterRegistry::new(
        entities
            .into_iter()
            .filter_map(Entity::into_character)
            .collect(),
    )
}

/// Run deduplication over an existing registry.
///
/// Identifiers are preserved. A registry produced by
/// [`dedupe_characters`] comes back unchanged.
pub fn dedupe_registry(registry: &CharacterRegistry) -> CharacterRegistry {
    dedupe_characters(registry.iter().map(CharacterCandidate::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_only_leading_title() {
        assert_eq!(normalize_name("Mr Smith"), "smith");
        assert_eq!(normalize_name("ms. jones"), "jones");
        assert_eq!(normalize_name("Drew Barrymore"), "drew barrymore");
        assert_eq!(normalize_name("The Dr. Who"), "the dr who");
    }

    #[test]
    fn test_normalize_collapses_whitespace_and_punctuation() {
        assert_eq!(normalize_name("  Jean-Luc\t Picard!! "), "jeanluc picard");
        assert_eq!(normalize_name("..."), "");
    }

    #[test]
    fn test_match_keys_include_words_and_aliases() {
        let keys = match_keys("Dr. Rachel Moore", ["Rach", "  ", "his wife"]);
        let expected: BTreeSet<String> = ["rachel moore", "rachel", "moore", "rach", "his wife"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_match_keys_empty_for_blank_name() {
        assert!(match_keys("?!", ["alias"]).is_empty());
    }
}
