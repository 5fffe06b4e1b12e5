//! Layered TOML configuration.
//!
//! Sources, later overriding earlier:
//! - Bundled defaults (include_str! from storyboard.toml)
//! - User config in the home directory (~/.config/storyboard/storyboard.toml)
//! - User config in the current directory (./storyboard.toml)
//!
//! Every section carries serde defaults, so a partial file is valid.

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use storyboard_core::{ANTI_TEXT_TAIL, DEFAULT_MAX_STORY_CHARS, STYLE_LOCK};
use storyboard_error::{ConfigError, StoryboardError, StoryboardResult};
use tracing::{debug, instrument};

/// Input limits.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest accepted story, in characters
    pub max_story_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_story_chars: DEFAULT_MAX_STORY_CHARS,
        }
    }
}

/// Scene-line segmentation window and model parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Smallest allowed line, in words
    pub min_words: usize,
    /// Largest allowed line, in words
    pub max_words: usize,
    /// Lower edge of the preferred line length
    pub target_min_words: usize,
    /// Upper edge of the preferred line length
    pub target_max_words: usize,
    /// Fewest valid model lines accepted before falling back
    pub min_viable_lines: usize,
    /// Sampling temperature
    pub temperature: f32,
    /// Token budget
    pub max_tokens: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_words: 8,
            max_words: 25,
            target_min_words: 12,
            target_max_words: 20,
            min_viable_lines: 5,
            temperature: 0.2,
            max_tokens: 2400,
        }
    }
}

/// Character extraction parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Sampling temperature
    pub temperature: f32,
    /// Token budget
    pub max_tokens: u32,
    /// Side characters rendered per scene line
    pub max_side_per_line: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 2400,
            max_side_per_line: 3,
        }
    }
}

/// Theme analysis parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Sampling temperature
    pub temperature: f32,
    /// Token budget
    pub max_tokens: u32,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 300,
        }
    }
}

/// Chat-completions backend settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Chat-completions URL
    pub endpoint: String,
    /// Model identifier
    pub model: String,
    /// System message sent with every request
    pub system_prompt: String,
    /// Environment variable prefix; keys are read from `{prefix}1..={prefix}{max_keys}`
    pub api_key_env_prefix: String,
    /// Highest key suffix probed
    pub max_keys: usize,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.longcat.chat/openai/v1/chat/completions".to_string(),
            model: "LongCat-Flash-Chat".to_string(),
            system_prompt: "You are a deterministic JSON generator and story analyzer. \
                            Always return valid JSON without commentary."
                .to_string(),
            api_key_env_prefix: "LONGCAT_API_KEY_".to_string(),
            max_keys: 10,
            timeout_secs: 60,
        }
    }
}

/// Backoff settings for transient failures.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first
    pub max_attempts: usize,
    /// Delay before the first retry
    pub initial_backoff_ms: u64,
    /// Cap on any single delay
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_delay_secs: 8,
        }
    }
}

/// Optional client-side throttling.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Requests per minute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm: Option<u32>,
    /// Concurrent in-flight requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<u32>,
}

impl ThrottleConfig {
    /// True when any limit is configured.
    pub fn is_enabled(&self) -> bool {
        self.rpm.is_some() || self.max_concurrent.is_some()
    }
}

/// Prompt assembly and per-line execution settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Style block prepended to every prompt
    pub style_lock: String,
    /// Closing clause appended to every prompt
    pub anti_text_tail: String,
    /// Scene lines processed concurrently
    pub concurrency: usize,
    /// Pause re-check interval
    pub pause_poll_ms: u64,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            style_lock: STYLE_LOCK.to_string(),
            anti_text_tail: ANTI_TEXT_TAIL.to_string(),
            concurrency: 4,
            pause_poll_ms: 250,
        }
    }
}

/// Top-level Storyboard configuration.
///
/// # Example
///
/// ```no_run
/// use storyboard_rate_limit::StoryboardConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StoryboardConfig::load()?;
/// println!("lines of {}-{} words", config.segmenter.min_words, config.segmenter.max_words);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoryboardConfig {
    /// Input limits
    pub limits: LimitsConfig,
    /// Segmentation
    pub segmenter: SegmenterConfig,
    /// Character extraction
    pub extraction: ExtractionConfig,
    /// Theme analysis
    pub theme: ThemeConfig,
    /// Backend
    pub generation: GenerationConfig,
    /// Retry
    pub retry: RetryConfig,
    /// Throttling
    pub throttle: ThrottleConfig,
    /// Prompt assembly
    pub prompt: PromptConfig,
}

const DEFAULT_CONFIG: &str = include_str!("../../../storyboard.toml");

impl StoryboardConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> StoryboardResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> StoryboardResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/storyboard/storyboard.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("storyboard").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Bundled defaults only, ignoring user files.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled file fails to parse.
    pub fn bundled() -> StoryboardResult<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to parse bundled configuration: {}",
                    e
                )))
            })
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first violated constraint.
    pub fn validate(&self) -> StoryboardResult<()> {
        let seg = &self.segmenter;
        if seg.min_words == 0 || seg.max_words == 0 {
            return Err(ConfigError::new("Segmenter word window must be non-zero").into());
        }
        if seg.min_words > seg.max_words {
            return Err(ConfigError::new(format!(
                "Segmenter min_words ({}) exceeds max_words ({})",
                seg.min_words, seg.max_words
            ))
            .into());
        }
        if seg.target_min_words > seg.target_max_words {
            return Err(ConfigError::new(format!(
                "Segmenter target_min_words ({}) exceeds target_max_words ({})",
                seg.target_min_words, seg.target_max_words
            ))
            .into());
        }
        if seg.target_min_words < seg.min_words || seg.target_max_words > seg.max_words {
            return Err(ConfigError::new(format!(
                "Segmenter target window {}-{} must lie inside the hard window {}-{}",
                seg.target_min_words, seg.target_max_words, seg.min_words, seg.max_words
            ))
            .into());
        }
        if self.limits.max_story_chars == 0 {
            return Err(ConfigError::new("max_story_chars must be non-zero").into());
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::new("retry.max_attempts must be at least 1").into());
        }
        if self.prompt.pause_poll_ms == 0 || self.prompt.pause_poll_ms >= 1000 {
            return Err(ConfigError::new(format!(
                "prompt.pause_poll_ms must be between 1 and 999, got {}",
                self.prompt.pause_poll_ms
            ))
            .into());
        }
        if self.prompt.concurrency == 0 {
            return Err(ConfigError::new("prompt.concurrency must be at least 1").into());
        }
        Ok(())
    }
}
