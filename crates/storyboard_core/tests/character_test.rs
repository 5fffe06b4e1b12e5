use serde_json::json;
use storyboard_core::{Appearance, Character, CharacterCategory, CharacterRegistry};

fn character(name: &str, category: CharacterCategory) -> Character {
    Character::builder()
        .name(name)
        .category(category)
        .build()
        .expect("valid character")
}

#[test]
fn test_character_json_wire_shape() {
    let character = Character::builder()
        .id("c-1")
        .name("Rachel Moore")
        .category(CharacterCategory::Main)
        .alias("Rach")
        .alias("his wife")
        .build()
        .expect("valid character");

    let value = serde_json::to_value(&character).expect("serialize");

    assert_eq!(value["id"], "c-1");
    assert_eq!(value["name"], "Rachel Moore");
    assert_eq!(value["category"], "main");
    assert_eq!(value["isGenerated"], false);
    assert_eq!(value["aliases"], json!(["Rach", "his wife"]));
    assert_eq!(value["appearance"]["face"], "average proportions");
    assert_eq!(value["appearance"]["eyes"]["shape"], "average");
    assert_eq!(value["appearance"]["eyes"]["hex"], "#6B4E3D");
    assert_eq!(value["appearance"]["hair"]["style"], "short");
    assert_eq!(value["appearance"]["hair"]["hex"], "#111111");
    assert_eq!(value["appearance"]["skin"]["hex"], "#C69C77");
    assert_eq!(value["appearance"]["body"]["age"], 30);
    assert_eq!(value["appearance"]["body"]["height_cm"], 170);
    assert_eq!(value["appearance"]["body"]["build"], "average");
    assert_eq!(value["appearance"]["mark"], "no visible mark");
    assert_eq!(value["appearance"]["accessory"], "simple wristwatch");
    assert_eq!(value["appearance"]["outfit"], "neutral outfit");
    assert_eq!(value["appearance"]["defaults"]["expression"], "neutral");
}

#[test]
fn test_character_deserializes_from_wire_json() {
    let value = json!({
        "id": "x",
        "name": "Chloe",
        "category": "side",
        "aliases": ["the barista"],
        "isGenerated": true,
        "appearance": serde_json::to_value(Appearance::default()).unwrap(),
    });

    let character: Character = serde_json::from_value(value).expect("deserialize");

    assert_eq!(character.name(), "Chloe");
    assert_eq!(*character.category(), CharacterCategory::Side);
    assert!(character.is_generated());
    assert!(character.aliases().contains("the barista"));
}

#[test]
fn test_builder_rejects_blank_name() {
    assert!(Character::builder().name("   ").build().is_err());
    assert!(Character::builder().build().is_err());
}

#[test]
fn test_builder_generates_unique_ids() {
    let a = character("A", CharacterCategory::Side);
    let b = character("A", CharacterCategory::Side);
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_surface_forms_list_name_then_aliases() {
    let c = Character::builder()
        .name("Emmett Brown")
        .category(CharacterCategory::Main)
        .alias("doc")
        .alias("Doc Brown")
        .alias("...")
        .build()
        .unwrap();

    assert!(c.is_main());
    assert_eq!(c.aliases().len(), 3);

    let forms: Vec<&str> = c.surface_forms().collect();
    assert_eq!(forms, vec!["Emmett Brown", "Doc Brown", "doc"]);
}

#[test]
fn test_summary_always_starts_with_age() {
    let mut dna = Appearance::default();
    dna.body.age = 7;
    assert!(dna.summary().starts_with("7 year old"));
}

#[test]
fn test_registry_sort_is_deterministic() {
    let input = vec![
        character("bob", CharacterCategory::Side),
        character("Alice", CharacterCategory::Side),
        character("Bob", CharacterCategory::Side),
        character("alice", CharacterCategory::Main),
    ];
    let mut reversed = input.clone();
    reversed.reverse();

    let a = CharacterRegistry::new(input);
    let b = CharacterRegistry::new(reversed);

    let names: Vec<_> = a.iter().map(|c| c.name().clone()).collect();
    assert_eq!(names, vec!["Alice", "alice", "Bob", "bob"]);
    let names_b: Vec<_> = b.iter().map(|c| c.name().clone()).collect();
    assert_eq!(names, names_b);
}

#[test]
fn test_registry_counts_and_serde() {
    let registry = CharacterRegistry::new(vec![
        character("Michael", CharacterCategory::Main),
        character("Chloe", CharacterCategory::Side),
        character("Rachel", CharacterCategory::Main),
    ]);

    let counts = registry.counts();
    assert_eq!((counts.main, counts.side, counts.total), (2, 1, 3));
    assert_eq!(registry.mains().count(), 2);

    let json = serde_json::to_value(&registry).unwrap();
    assert!(json.is_array());
    let back: CharacterRegistry = serde_json::from_value(json).unwrap();
    assert_eq!(back, registry);
}
