//! Raw extraction output and its repair into canonical characters.
//!
//! Model output is loosely typed: numbers arrive as strings, colours without a
//! leading `#`, fields go missing. Candidates keep every leaf optional so that
//! merging can tell "absent" from "present", and [`AppearanceCandidate::resolve`]
//! fills the gaps with fixed defaults.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use storyboard_core::{
    Appearance, BodyDna, Character, CharacterCategory, DefaultsDna, EyesDna, HairDna, SkinDna,
};

static HEX_COLOUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?[0-9A-Fa-f]{6}$").expect("Valid hex colour regex"));

/// Non-empty trimmed text from a string or number leaf.
fn text(value: &Option<Value>) -> Option<String> {
    match value.as_ref()? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Positive integer from a number or numeric string leaf.
fn number(value: &Option<Value>) -> Option<u32> {
    let parsed = match value.as_ref()? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.round() as u64)
            })
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.filter(|n| *n > 0)
}

/// `#RRGGBB` colour, adding the `#` when missing.
fn hex(value: &Option<Value>) -> Option<String> {
    let raw = text(value)?;
    if !HEX_COLOUR.is_match(&raw) {
        return None;
    }
    Some(if raw.starts_with('#') {
        raw
    } else {
        format!("#{}", raw)
    })
}

/// Keep `incoming` when it carries a value, else `existing`.
fn overlay(existing: &mut Option<Value>, incoming: &Option<Value>) {
    if text(incoming).is_some() {
        *existing = incoming.clone();
    }
}

/// Eye leaf pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyesCandidate {
    /// Shape
    pub shape: Option<Value>,
    /// Colour
    pub hex: Option<Value>,
}

/// Hair leaf pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HairCandidate {
    /// Style
    pub style: Option<Value>,
    /// Colour
    pub hex: Option<Value>,
}

/// Skin leaf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinCandidate {
    /// Colour
    pub hex: Option<Value>,
}

/// Body leaves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyCandidate {
    /// Age in years
    pub age: Option<Value>,
    /// Height in centimetres
    pub height_cm: Option<Value>,
    /// Build
    pub build: Option<Value>,
}

/// Defaults leaves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsCandidate {
    /// Resting expression
    pub expression: Option<Value>,
}

/// Partially specified appearance record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceCandidate {
    /// Face
    pub face: Option<Value>,
    /// Eyes
    pub eyes: EyesCandidate,
    /// Hair
    pub hair: HairCandidate,
    /// Skin
    pub skin: SkinCandidate,
    /// Body
    pub body: BodyCandidate,
    /// Distinguishing mark
    pub mark: Option<Value>,
    /// Signature accessory
    pub accessory: Option<Value>,
    /// Outfit
    pub outfit: Option<Value>,
    /// Resting defaults
    pub defaults: DefaultsCandidate,
}

impl AppearanceCandidate {
    /// Overlay `incoming` field by field; present incoming leaves win.
    pub fn merge(&mut self, incoming: &AppearanceCandidate) {
        overlay(&mut self.face, &incoming.face);
        overlay(&mut self.eyes.shape, &incoming.eyes.shape);
        overlay(&mut self.eyes.hex, &incoming.eyes.hex);
        overlay(&mut self.hair.style, &incoming.hair.style);
        overlay(&mut self.hair.hex, &incoming.hair.hex);
        overlay(&mut self.skin.hex, &incoming.skin.hex);
        overlay(&mut self.body.age, &incoming.body.age);
        overlay(&mut self.body.height_cm, &incoming.body.height_cm);
        overlay(&mut self.body.build, &incoming.body.build);
        overlay(&mut self.mark, &incoming.mark);
        overlay(&mut self.accessory, &incoming.accessory);
        overlay(&mut self.outfit, &incoming.outfit);
        overlay(&mut self.defaults.expression, &incoming.defaults.expression);
    }

    /// Fully populated appearance, defaulting every missing or invalid leaf.
    pub fn resolve(&self) -> Appearance {
        let d = Appearance::default();
        Appearance {
            face: text(&self.face).unwrap_or(d.face),
            eyes: EyesDna {
                shape: text(&self.eyes.shape).unwrap_or(d.eyes.shape),
                hex: hex(&self.eyes.hex).unwrap_or(d.eyes.hex),
            },
            hair: HairDna {
                style: text(&self.hair.style).unwrap_or(d.hair.style),
                hex: hex(&self.hair.hex).unwrap_or(d.hair.hex),
            },
            skin: SkinDna {
                hex: hex(&self.skin.hex).unwrap_or(d.skin.hex),
            },
            body: BodyDna {
                age: number(&self.body.age).unwrap_or(d.body.age),
                height_cm: number(&self.body.height_cm).unwrap_or(d.body.height_cm),
                build: text(&self.body.build).unwrap_or(d.body.build),
            },
            mark: text(&self.mark).unwrap_or(d.mark),
            accessory: text(&self.accessory).unwrap_or(d.accessory),
            outfit: text(&self.outfit).unwrap_or(d.outfit),
            defaults: DefaultsDna {
                expression: text(&self.defaults.expression).unwrap_or(d.defaults.expression),
            },
        }
    }
}

impl From<&Appearance> for AppearanceCandidate {
    fn from(a: &Appearance) -> Self {
        let s = |v: &str| Some(Value::String(v.to_string()));
        let n = |v: u32| Some(Value::from(v));
        Self {
            face: s(&a.face),
            eyes: EyesCandidate {
                shape: s(&a.eyes.shape),
                hex: s(&a.eyes.hex),
            },
            hair: HairCandidate {
                style: s(&a.hair.style),
                hex: s(&a.hair.hex),
            },
            skin: SkinCandidate { hex: s(&a.skin.hex) },
            body: BodyCandidate {
                age: n(a.body.age),
                height_cm: n(a.body.height_cm),
                build: s(&a.body.build),
            },
            mark: s(&a.mark),
            accessory: s(&a.accessory),
            outfit: s(&a.outfit),
            defaults: DefaultsCandidate {
                expression: s(&a.defaults.expression),
            },
        }
    }
}

/// One person as reported by the extraction call, before deduplication.
///
/// Accepts both the `appearance`/`isGenerated` wire names and the
/// `dna`/`isAIGenerated` names models tend to echo back.
///
/// # Examples
///
/// ```
/// use storyboard_pipeline::CharacterCandidate;
///
/// let raw = r#"{"name": "Rachel", "category": "main", "aliases": ["Rach"],
///               "dna": {"body": {"age": "34"}, "eyes": {"hex": "3A5F0B"}}}"#;
/// let candidate: CharacterCandidate = serde_json::from_str(raw).unwrap();
/// let dna = candidate.appearance.resolve();
///
/// assert_eq!(dna.body.age, 34);
/// assert_eq!(dna.eyes.hex, "#3A5F0B");
/// assert_eq!(dna.accessory, "simple wristwatch");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterCandidate {
    /// Identifier carried over from an existing character
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Reported name
    pub name: Option<String>,
    /// `main` or `side`; anything else reads as side
    pub category: Option<String>,
    /// Surface forms
    #[serde(deserialize_with = "lenient_aliases")]
    pub aliases: Vec<String>,
    /// Name was synthesized
    #[serde(rename = "isGenerated", alias = "isAIGenerated", alias = "is_generated")]
    pub is_generated: Option<bool>,
    /// Appearance leaves
    #[serde(alias = "dna")]
    pub appearance: AppearanceCandidate,
}

/// Accept an alias list, a single string or null.
fn lenient_aliases<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    })
}

impl CharacterCandidate {
    /// Candidate with just a name and aliases.
    pub fn named<I, S>(name: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Some(name.into()),
            aliases: aliases.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: CharacterCategory) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Mark the name as synthesized or verbatim.
    pub fn generated(mut self, is_generated: bool) -> Self {
        self.is_generated = Some(is_generated);
        self
    }

    /// Trimmed display name, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// Parsed category; unknown values are side characters.
    pub fn category(&self) -> CharacterCategory {
        self.category
            .as_deref()
            .and_then(|c| c.trim().parse().ok())
            .unwrap_or(CharacterCategory::Side)
    }

    /// Whether the name was synthesized.
    pub fn is_generated(&self) -> bool {
        self.is_generated.unwrap_or(false)
    }
}

impl From<&Character> for CharacterCandidate {
    fn from(c: &Character) -> Self {
        Self {
            id: Some(c.id().clone()),
            name: Some(c.name().clone()),
            category: Some(c.category().to_string()),
            aliases: c.aliases().iter().cloned().collect(),
            is_generated: Some(c.is_generated()),
            appearance: AppearanceCandidate::from(c.appearance()),
        }
    }
}
