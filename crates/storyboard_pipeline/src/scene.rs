//! Keyword-based scene description.

use regex::Regex;
use std::sync::LazyLock;

fn keyword_regex(words: &[&str]) -> Regex {
    let alternatives = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives)).expect("Valid keyword regex")
}

static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    keyword_regex(&[
        "living room",
        "kitchen",
        "office",
        "rooftop",
        "street",
        "alley",
        "bedroom",
        "hotel",
        "train",
        "car",
        "park",
        "hallway",
    ])
});

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    keyword_regex(&[
        "midnight", "night", "dawn", "dusk", "sunset", "morning", "noon", "evening",
    ])
});

static ATMOSPHERE: LazyLock<Regex> = LazyLock::new(|| {
    keyword_regex(&["rain", "smoke", "fog", "haze", "neon", "storm", "snow"])
});

static CAMERA: LazyLock<Regex> = LazyLock::new(|| {
    keyword_regex(&[
        "close-up",
        "close",
        "medium",
        "wide",
        "overhead",
        "low-angle",
        "high-angle",
    ])
});

fn first_match(regex: &Regex, line: &str, default: &str) -> String {
    regex
        .find(line)
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_else(|| default.to_string())
}

/// Describe the environment and framing of a scene line.
///
/// Each category takes the earliest keyword found in the line, matched on
/// word boundaries and case-insensitively.
///
/// # Examples
///
/// ```
/// use storyboard_pipeline::describe_scene;
///
/// let description = describe_scene("Rain hammers the office window at night");
/// assert_eq!(
///     description,
///     "Environment: office, night, rain; Camera: medium shot; \
///      visual elements guided by line: \"Rain hammers the office window at night\"."
/// );
/// ```
pub fn describe_scene(line: &str) -> String {
    let location = first_match(&LOCATION, line, "story location");
    let time = first_match(&TIME, line, "unspecified time");
    let atmosphere = first_match(&ATMOSPHERE, line, "neutral air");
    let camera = first_match(&CAMERA, line, "medium shot");
    format!(
        "Environment: {}, {}, {}; Camera: {}; visual elements guided by line: \"{}\".",
        location,
        time,
        atmosphere,
        camera,
        line.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_matches() {
        assert_eq!(
            describe_scene("She waits."),
            "Environment: story location, unspecified time, neutral air; \
             Camera: medium shot; visual elements guided by line: \"She waits.\"."
        );
    }

    #[test]
    fn test_first_keyword_in_line_wins() {
        let description = describe_scene("From the park to the kitchen at dawn, then night");
        assert!(description.starts_with("Environment: park, dawn, neutral air;"));
    }

    #[test]
    fn test_word_boundaries() {
        // "scared" contains "car", "snowflake" is not "snow"
        let description = describe_scene("The scared boy catches a snowflake");
        assert!(description.starts_with("Environment: story location, unspecified time, neutral air;"));
    }

    #[test]
    fn test_multi_word_and_hyphenated_keywords() {
        let description = describe_scene("A close-up in the Living Room");
        assert!(description.contains("living room"));
        assert!(description.contains("Camera: close-up;"));
    }
}
