//! Tests for the command-line interface.

use clap::Parser;
use std::io::Write;
use std::path::Path;
use storyboard::cli::{
    Cli, Commands, StoryboardSession, load_config, read_story, run_analyze, run_characters,
    run_config, run_prompts, run_segment,
};
use storyboard::{PromptLength, StoryboardConfig};
use tempfile::NamedTempFile;

const STORY: &str = "Michael opens the door of the quiet apartment and listens for a while.\n\n\
                     The hallway light flickers twice before it finally goes dark again.\n\n\
                     Time stops.\n\nThe coffee mug falls.\n\nRachel screams.";

fn offline_session() -> StoryboardSession {
    StoryboardSession::new(StoryboardConfig::default(), true).unwrap()
}

fn output(buffer: Vec<u8>) -> serde_json::Value {
    serde_json::from_slice(&buffer).unwrap()
}

#[test]
fn test_parse_prompts_command() {
    let cli = Cli::try_parse_from([
        "storyboard",
        "--offline",
        "prompts",
        "story.txt",
        "--length",
        "quick",
        "--refine",
        "--style",
        "Ink wash.",
    ])
    .unwrap();

    assert!(cli.offline);
    match cli.command {
        Commands::Prompts {
            file,
            style,
            length,
            refine,
        } => {
            assert_eq!(file, Path::new("story.txt"));
            assert_eq!(style.as_deref(), Some("Ink wash."));
            assert_eq!(length, PromptLength::Quick);
            assert!(refine);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_parse_defaults_and_global_flags() {
    let cli = Cli::try_parse_from(["storyboard", "prompts", "-", "--verbose", "--json-logs"]).unwrap();
    assert!(cli.verbose);
    assert!(cli.json_logs);
    assert!(!cli.offline);
    assert!(cli.config.is_none());
    match cli.command {
        Commands::Prompts { length, refine, .. } => {
            assert_eq!(length, PromptLength::Balanced);
            assert!(!refine);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_parse_rejects_unknown_length() {
    assert!(Cli::try_parse_from(["storyboard", "prompts", "a.txt", "--length", "epic"]).is_err());
    assert!(Cli::try_parse_from(["storyboard", "segment"]).is_err());
}

#[test]
fn test_read_story_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", STORY).unwrap();
    assert_eq!(read_story(file.path()).unwrap(), STORY);
    assert!(read_story(Path::new("/nonexistent/story.txt")).is_err());
}

#[test]
fn test_config_round_trips_through_toml() {
    let mut config = StoryboardConfig::default();
    config.prompt.concurrency = 7;
    config.throttle.rpm = Some(30);

    let mut buffer = Vec::new();
    run_config(&config, &mut buffer).unwrap();

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(&buffer).unwrap();

    let loaded = load_config(Some(file.path())).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_config_reports_invalid_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[segmenter]\nmin_words = 30\nmax_words = 10").unwrap();
    assert!(load_config(Some(file.path())).is_err());
}

#[tokio::test]
async fn test_segment_offline_uses_fallback() {
    let mut buffer = Vec::new();
    run_segment(&offline_session(), STORY, &mut buffer).await.unwrap();

    let json = output(buffer);
    let lines: Vec<&str> = json["lines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l.as_str().unwrap())
        .collect();
    assert_eq!(
        lines,
        vec![
            "Michael opens the door of the quiet apartment and listens for a while.",
            "The hallway light flickers twice before it finally goes dark again.",
            "Time stops. The coffee mug falls. Rachel screams.",
        ]
    );
}

#[tokio::test]
async fn test_characters_offline_is_empty() {
    let mut buffer = Vec::new();
    run_characters(&offline_session(), STORY, &mut buffer)
        .await
        .unwrap();

    let json = output(buffer);
    assert_eq!(json["characters"], serde_json::json!([]));
    assert_eq!(json["counts"]["total"], 0);
}

#[tokio::test]
async fn test_analyze_offline_reports_defaults() {
    let mut buffer = Vec::new();
    run_analyze(&offline_session(), STORY, &mut buffer)
        .await
        .unwrap();

    let json = output(buffer);
    assert_eq!(json["theme"]["era"], "Modern Day");
    assert_eq!(json["lines"].as_array().unwrap().len(), 3);
    assert_eq!(json["lines"][2]["index"], 3);
}

#[tokio::test]
async fn test_prompts_offline_builds_every_line() {
    let session = offline_session().with_style("Ink wash.");
    let mut buffer = Vec::new();
    run_prompts(&session, STORY, &mut buffer).await.unwrap();

    let json = output(buffer);
    assert_eq!(json["cancelled"], false);
    assert_eq!(json["total_lines"], 3);
    let prompts = json["prompts"].as_array().unwrap();
    assert_eq!(prompts.len(), 3);
    assert!(prompts
        .iter()
        .all(|p| p["prompt"].as_str().unwrap().starts_with("Ink wash.")));
}

#[tokio::test]
async fn test_cancelled_session_prints_empty_run() {
    let session = offline_session();
    session.control().cancel();

    let mut buffer = Vec::new();
    run_prompts(&session, STORY, &mut buffer).await.unwrap();

    let json = output(buffer);
    assert_eq!(json["cancelled"], true);
    assert_eq!(json["prompts"], serde_json::json!([]));
}

#[tokio::test]
async fn test_empty_story_is_rejected() {
    let mut buffer = Vec::new();
    assert!(run_segment(&offline_session(), "  \n ", &mut buffer).await.is_err());
    assert!(buffer.is_empty());
}
