//! Tests for layered configuration.

use std::io::Write;
use storyboard_rate_limit::StoryboardConfig;
use storyboard_error::StoryboardErrorKind;
use tempfile::Builder;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn test_bundled_defaults_match_builtin_defaults() {
    let bundled = StoryboardConfig::bundled().unwrap();
    assert_eq!(bundled, StoryboardConfig::default());
}

#[test]
fn test_bundled_values() {
    let config = StoryboardConfig::bundled().unwrap();

    assert_eq!(config.limits.max_story_chars, 120_000);
    assert_eq!(config.segmenter.min_words, 8);
    assert_eq!(config.segmenter.max_words, 25);
    assert_eq!(config.segmenter.min_viable_lines, 5);
    assert_eq!(config.extraction.max_side_per_line, 3);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.generation.api_key_env_prefix, "LONGCAT_API_KEY_");
    assert!(!config.throttle.is_enabled());
    assert!(config.prompt.pause_poll_ms < 1000);
    assert!(config.prompt.style_lock.starts_with("Semi-realistic 90s"));
}

#[test]
fn test_partial_file_keeps_defaults() {
    let file = write_config(
        r#"
[segmenter]
max_words = 30

[throttle]
rpm = 42
"#,
    );

    let config = StoryboardConfig::from_file(file.path()).unwrap();

    assert_eq!(config.segmenter.max_words, 30);
    assert_eq!(config.segmenter.min_words, 8);
    assert_eq!(config.throttle.rpm, Some(42));
    assert_eq!(config.throttle.max_concurrent, None);
    assert!(config.throttle.is_enabled());
    assert_eq!(config.retry, StoryboardConfig::default().retry);
}

#[test]
fn test_validation_rejects_inverted_window() {
    let file = write_config(
        r#"
[segmenter]
min_words = 30
max_words = 10
"#,
    );

    let err = StoryboardConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err.kind(), StoryboardErrorKind::Config(_)));
    assert!(err.to_string().contains("min_words"));
}

#[test]
fn test_validation_rejects_slow_pause_poll() {
    let mut config = StoryboardConfig::default();
    config.prompt.pause_poll_ms = 1000;
    assert!(config.validate().is_err());

    config.prompt.pause_poll_ms = 999;
    assert!(config.validate().is_ok());
}

#[test]
fn test_validation_rejects_target_window_outside_hard_window() {
    let mut config = StoryboardConfig::default();
    config.segmenter.target_min_words = 5;
    config.segmenter.target_max_words = 6;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("target window 5-6"));

    let mut config = StoryboardConfig::default();
    config.segmenter.target_max_words = 26;
    assert!(config.validate().is_err());

    let mut config = StoryboardConfig::default();
    config.segmenter.target_min_words = 8;
    config.segmenter.target_max_words = 25;
    assert!(config.validate().is_ok());
}

#[test]
fn test_target_window_checked_when_loading_file() {
    let file = write_config(
        r#"
[segmenter]
target_min_words = 5
target_max_words = 6
"#,
    );

    let err = StoryboardConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err.kind(), StoryboardErrorKind::Config(_)));
}

#[test]
fn test_validation_rejects_zero_window() {
    let mut config = StoryboardConfig::default();
    config.segmenter.min_words = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_missing_file_is_config_error() {
    let err = StoryboardConfig::from_file("/nonexistent/storyboard.toml").unwrap_err();
    assert!(matches!(err.kind(), StoryboardErrorKind::Config(_)));
}
