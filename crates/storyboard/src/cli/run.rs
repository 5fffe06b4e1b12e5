//! Command handlers.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use storyboard_error::GenerationErrorKind;
use storyboard_interface::{CancelToken, TextGenerator};
use storyboard_models::{OfflineGenerator, OpenAICompatibleClient};
use storyboard_pipeline::{PromptRefiner, RunControl, Storyboard};
use storyboard_rate_limit::{RateLimiter, RetryPolicy, RetryingGenerator, StoryboardConfig};
use tracing::{info, instrument, warn};

/// Generator stack used by the CLI.
pub type SessionGenerator = RetryingGenerator<Box<dyn TextGenerator>>;

/// Load configuration from `path`, or the layered defaults when `None`.
pub fn load_config(path: Option<&Path>) -> Result<StoryboardConfig> {
    match path {
        Some(path) => StoryboardConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => StoryboardConfig::load().context("Failed to load configuration"),
    }
}

/// Read a story from a file, or stdin for `-`.
pub fn read_story(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read story from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read story from {}", path.display()))
}

/// Wrap the configured backend with retry, throttling and cancellation.
///
/// Without API keys, or with `offline`, the backend is an
/// [`OfflineGenerator`] and retries are disabled.
pub fn build_generator(
    config: &StoryboardConfig,
    offline: bool,
    cancel: CancelToken,
) -> Result<SessionGenerator> {
    let client = if offline {
        None
    } else {
        match OpenAICompatibleClient::from_config(&config.generation) {
            Ok(client) => Some(client),
            Err(e) if e.kind == GenerationErrorKind::NoCredentials => {
                warn!(
                    prefix = %config.generation.api_key_env_prefix,
                    "No API keys found, running offline"
                );
                None
            }
            Err(e) => return Err(e).context("Failed to create generation client"),
        }
    };

    let (inner, policy): (Box<dyn TextGenerator>, RetryPolicy) = match client {
        Some(client) => {
            info!(model = %config.generation.model, "Using chat-completions backend");
            (Box::new(client), RetryPolicy::from(&config.retry))
        }
        None => (Box::new(OfflineGenerator), RetryPolicy::no_retry()),
    };

    let mut generator = RetryingGenerator::new(inner, policy).with_cancel(cancel);
    if config.throttle.is_enabled() {
        generator = generator.with_limiter(RateLimiter::new(&config.throttle));
    }
    Ok(generator)
}

/// A configured pipeline plus the control handle for its runs.
pub struct StoryboardSession {
    storyboard: Storyboard<SessionGenerator>,
    control: RunControl,
}

impl std::fmt::Debug for StoryboardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryboardSession")
            .field("provider", &self.storyboard.generator().provider_name())
            .field("model", &self.storyboard.generator().model_name())
            .field("control", &self.control)
            .finish()
    }
}

impl StoryboardSession {
    /// Build a session; generation calls observe the session's cancel token.
    pub fn new(config: StoryboardConfig, offline: bool) -> Result<Self> {
        let cancel = CancelToken::new();
        let control = RunControl::with_token(
            cancel.clone(),
            Duration::from_millis(config.prompt.pause_poll_ms),
        );
        let generator = build_generator(&config, offline, cancel)?;
        Ok(Self {
            storyboard: Storyboard::new(generator, config),
            control,
        })
    }

    /// Replace the style block.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.storyboard = self.storyboard.with_style(style);
        self
    }

    /// Refine every prompt.
    pub fn with_refiner(mut self, refiner: PromptRefiner) -> Self {
        self.storyboard = self.storyboard.with_refiner(refiner);
        self
    }

    /// The pipeline.
    pub fn storyboard(&self) -> &Storyboard<SessionGenerator> {
        &self.storyboard
    }

    /// Pause and cancel handle.
    pub fn control(&self) -> &RunControl {
        &self.control
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("Failed to serialize output")?;
    writeln!(out).context("Failed to write output")?;
    Ok(())
}

/// `segment`: `{"lines": [...]}`.
#[instrument(skip_all)]
pub async fn run_segment<W: Write>(session: &StoryboardSession, story: &str, out: &mut W) -> Result<()> {
    let lines = session.storyboard().segment(story).await?;
    let texts: Vec<&str> = lines.iter().map(|l| l.text().as_str()).collect();
    write_json(out, &json!({ "lines": texts }))
}

/// `characters`: `{"characters": [...], "counts": {...}}`.
#[instrument(skip_all)]
pub async fn run_characters<W: Write>(
    session: &StoryboardSession,
    story: &str,
    out: &mut W,
) -> Result<()> {
    let registry = session.storyboard().characters(story, None).await?;
    write_json(
        out,
        &json!({ "characters": registry, "counts": registry.counts() }),
    )
}

/// `analyze`: the full story analysis.
#[instrument(skip_all)]
pub async fn run_analyze<W: Write>(session: &StoryboardSession, story: &str, out: &mut W) -> Result<()> {
    let analysis = session.storyboard().analyze(story).await?;
    write_json(out, &analysis)
}

/// `prompts`: one prompt per scene line.
///
/// A cancelled run still prints every prompt built before cancellation.
#[instrument(skip_all)]
pub async fn run_prompts<W: Write>(session: &StoryboardSession, story: &str, out: &mut W) -> Result<()> {
    let analysis = session.storyboard().analyze(story).await?;
    let run = session
        .storyboard()
        .generate_prompts(&analysis, session.control())
        .await;
    if run.cancelled {
        warn!(
            built = run.prompts.len(),
            total = run.total_lines,
            "Run cancelled, printing partial results"
        );
    }
    write_json(out, &run)
}

/// `config`: effective configuration as TOML.
pub fn run_config<W: Write>(config: &StoryboardConfig, out: &mut W) -> Result<()> {
    let text = toml::to_string_pretty(config).context("Failed to render configuration")?;
    out.write_all(text.as_bytes())
        .context("Failed to write output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_generator_disables_retries() {
        let config = StoryboardConfig::default();
        let generator = build_generator(&config, true, CancelToken::new()).unwrap();
        assert_eq!(*generator.policy().max_attempts(), 1);
        assert_eq!(generator.provider_name(), "offline");
    }
}
