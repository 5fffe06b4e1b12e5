//! Character identity records.
//!
//! A [`Character`] is one deduplicated person in a story together with the
//! fully populated [`Appearance`] record ("DNA") used to keep them visually
//! consistent across every prompt.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Whether a character is a named lead or an implied background figure.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CharacterCategory {
    /// Explicitly named, recurring character
    #[display("main")]
    Main,
    /// Unnamed or implied character
    #[default]
    #[display("side")]
    Side,
}

impl CharacterCategory {
    /// True for [`CharacterCategory::Main`].
    pub fn is_main(&self) -> bool {
        matches!(self, CharacterCategory::Main)
    }
}

/// Eye shape and colour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EyesDna {
    /// Eye shape description
    pub shape: String,
    /// Eye colour as `#RRGGBB`
    pub hex: String,
}

impl Default for EyesDna {
    fn default() -> Self {
        Self {
            shape: "average".to_string(),
            hex: "#6B4E3D".to_string(),
        }
    }
}

/// Hair style and colour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HairDna {
    /// Length, texture and style
    pub style: String,
    /// Hair colour as `#RRGGBB`
    pub hex: String,
}

impl Default for HairDna {
    fn default() -> Self {
        Self {
            style: "short".to_string(),
            hex: "#111111".to_string(),
        }
    }
}

/// Skin tone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkinDna {
    /// Skin colour as `#RRGGBB`
    pub hex: String,
}

impl Default for SkinDna {
    fn default() -> Self {
        Self {
            hex: "#C69C77".to_string(),
        }
    }
}

/// Age and physique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyDna {
    /// Age in years
    pub age: u32,
    /// Height in centimetres
    pub height_cm: u32,
    /// Build description
    pub build: String,
}

impl Default for BodyDna {
    fn default() -> Self {
        Self {
            age: 30,
            height_cm: 170,
            build: "average".to_string(),
        }
    }
}

/// Resting presentation defaults.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefaultsDna {
    /// Default facial expression
    pub expression: String,
}

impl Default for DefaultsDna {
    fn default() -> Self {
        Self {
            expression: "neutral".to_string(),
        }
    }
}

/// Fully populated visual identity record.
///
/// Every field always carries a value; missing extraction output is replaced
/// by the `Default` values before an `Appearance` is constructed.
///
/// # Examples
///
/// ```
/// use storyboard_core::Appearance;
///
/// let dna = Appearance::default();
/// assert_eq!(dna.body.age, 30);
/// assert_eq!(dna.accessory, "simple wristwatch");
/// assert!(dna.summary().starts_with("30 year old"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Appearance {
    /// Face shape and proportions
    pub face: String,
    /// Eyes
    pub eyes: EyesDna,
    /// Hair
    pub hair: HairDna,
    /// Skin
    pub skin: SkinDna,
    /// Body
    pub body: BodyDna,
    /// One permanent distinguishing mark
    pub mark: String,
    /// One signature accessory
    pub accessory: String,
    /// Clothing
    pub outfit: String,
    /// Resting defaults
    pub defaults: DefaultsDna,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            face: "average proportions".to_string(),
            eyes: EyesDna::default(),
            hair: HairDna::default(),
            skin: SkinDna::default(),
            body: BodyDna::default(),
            mark: "no visible mark".to_string(),
            accessory: "simple wristwatch".to_string(),
            outfit: "neutral outfit".to_string(),
            defaults: DefaultsDna::default(),
        }
    }
}

impl Appearance {
    /// One-line prose description, always opening with `"<N> year old"`.
    pub fn summary(&self) -> String {
        format!(
            "{} year old, {} build, {}cm tall, {} face, {} {} eyes, {} {} hair, skin {}, {}, wearing {}, carrying {}, {} expression",
            self.body.age,
            self.body.build,
            self.body.height_cm,
            self.face,
            self.eyes.shape,
            self.eyes.hex,
            self.hair.style,
            self.hair.hex,
            self.skin.hex,
            self.mark,
            self.outfit,
            self.accessory,
            self.defaults.expression,
        )
    }
}

/// A deduplicated human entity.
///
/// Characters are built once, by deduplication, and are read-only afterwards.
///
/// # Examples
///
/// ```
/// use storyboard_core::{Character, CharacterCategory};
///
/// let rachel = Character::builder()
///     .name("Rachel")
///     .category(CharacterCategory::Main)
///     .alias("Rach")
///     .build()
///     .unwrap();
///
/// assert_eq!(rachel.name(), "Rachel");
/// assert!(rachel.aliases().contains("Rach"));
/// assert!(!rachel.is_generated());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct Character {
    /// Opaque unique identifier
    #[builder(default = "uuid::Uuid::new_v4().to_string()")]
    id: String,
    /// Display name (verbatim or synthesized)
    name: String,
    /// Lead or background figure
    #[builder(default)]
    category: CharacterCategory,
    /// Every surface form referring to this character
    #[builder(default, setter(each(name = "alias", into)))]
    #[serde(default)]
    aliases: BTreeSet<String>,
    /// True when `name` was synthesized rather than found in the text
    #[builder(default)]
    #[serde(rename = "isGenerated", default)]
    #[getter(skip)]
    is_generated: bool,
    /// Visual identity record
    #[builder(default)]
    appearance: Appearance,
}

impl CharacterBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.name {
            Some(name) if name.trim().is_empty() => Err("Character name must not be empty".into()),
            _ => Ok(()),
        }
    }
}

impl Character {
    /// Create a builder for a character.
    pub fn builder() -> CharacterBuilder {
        CharacterBuilder::default()
    }

    /// Whether the name was synthesized.
    pub fn is_generated(&self) -> bool {
        self.is_generated
    }

    /// Whether this is a main character.
    pub fn is_main(&self) -> bool {
        self.category.is_main()
    }

    /// Name followed by every alias that carries at least one word character.
    ///
    /// Forms made only of punctuation or whitespace (`"..."`, `"?"`) are
    /// skipped; they cannot identify anyone.
    pub fn surface_forms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.aliases.iter().map(String::as_str))
            .filter(|form| form.chars().any(|c| c.is_alphanumeric() || c == '_'))
    }
}
