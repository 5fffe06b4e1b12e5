//! Story-to-prompts orchestration.

use crate::{
    CharacterExtractor, CharacterResolver, PromptAssembler, PromptRefiner, RunControl,
    TextSegmenter, ThemeAnalyzer,
};
use futures::{StreamExt, stream};
use serde::{Deserialize, Serialize};
use storyboard_core::{
    CastCounts, Character, CharacterRegistry, GeneratedPrompt, SceneLine, StoryText, ThemeProfile,
};
use storyboard_error::StoryboardResult;
use storyboard_interface::TextGenerator;
use storyboard_rate_limit::StoryboardConfig;
use tracing::{debug, info, instrument};

/// Everything known about a story before prompts are built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryAnalysis {
    /// Theme classification
    pub theme: ThemeProfile,
    /// Ordered scene lines
    pub lines: Vec<SceneLine>,
    /// Deduplicated characters
    pub characters: CharacterRegistry,
    /// Characters per category
    pub counts: CastCounts,
}

/// Output of a prompt run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRun {
    /// Prompts ordered by scene line index
    pub prompts: Vec<GeneratedPrompt>,
    /// Whether the run stopped early
    pub cancelled: bool,
    /// Number of scene lines in the analysis
    pub total_lines: usize,
}

impl PromptRun {
    /// Whether every scene line got a prompt.
    pub fn is_complete(&self) -> bool {
        self.prompts.len() == self.total_lines
    }
}

/// Runs the full pipeline against one generator.
///
/// # Example
///
/// ```no_run
/// use storyboard_pipeline::{RunControl, Storyboard};
/// use storyboard_rate_limit::StoryboardConfig;
/// # use storyboard_interface::TextGenerator;
///
/// # async fn run<G: TextGenerator>(generator: G) -> storyboard_error::StoryboardResult<()> {
/// let storyboard = Storyboard::new(generator, StoryboardConfig::load()?);
/// let analysis = storyboard.analyze("Michael picks up the phone...").await?;
/// let run = storyboard.generate_prompts(&analysis, &RunControl::default()).await;
/// println!("{} prompts", run.prompts.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, derive_getters::Getters)]
pub struct Storyboard<G> {
    generator: G,
    config: StoryboardConfig,
    assembler: PromptAssembler,
    refiner: Option<PromptRefiner>,
}

impl<G: TextGenerator> Storyboard<G> {
    /// Create an orchestrator; the prompt style comes from `config.prompt`.
    pub fn new(generator: G, config: StoryboardConfig) -> Self {
        let assembler = PromptAssembler::from(&config.prompt);
        Self {
            generator,
            config,
            assembler,
            refiner: None,
        }
    }

    /// Replace the style block.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.assembler = self.assembler.with_style(style);
        self
    }

    /// Rewrite every assembled prompt with `refiner`.
    pub fn with_refiner(mut self, refiner: PromptRefiner) -> Self {
        self.refiner = Some(refiner);
        self
    }

    fn story(&self, text: &str) -> StoryboardResult<StoryText> {
        Ok(StoryText::new(text, self.config.limits.max_story_chars)?)
    }

    /// Validate and segment a story.
    ///
    /// # Errors
    ///
    /// Only input validation fails; generation problems select the fallback.
    pub async fn segment(&self, text: &str) -> StoryboardResult<Vec<SceneLine>> {
        let story = self.story(text)?;
        Ok(TextSegmenter::new(self.config.segmenter.clone())
            .segment(&self.generator, &story)
            .await)
    }

    /// Validate a story and extract its characters.
    ///
    /// # Errors
    ///
    /// Only input validation fails; generation problems yield an empty registry.
    pub async fn characters(
        &self,
        text: &str,
        theme: Option<&ThemeProfile>,
    ) -> StoryboardResult<CharacterRegistry> {
        let story = self.story(text)?;
        Ok(CharacterExtractor::new(self.config.extraction.clone())
            .extract(&self.generator, &story, theme)
            .await)
    }

    /// Theme, scene lines and characters for a story.
    ///
    /// # Errors
    ///
    /// Returns a story error for empty or oversized input. Every later stage
    /// degrades instead of failing.
    #[instrument(skip_all, fields(story_chars = text.len(), provider = self.generator.provider_name()))]
    pub async fn analyze(&self, text: &str) -> StoryboardResult<StoryAnalysis> {
        let story = self.story(text)?;

        let theme = ThemeAnalyzer::new(self.config.theme.clone())
            .analyze(&self.generator, &story)
            .await;
        let lines = TextSegmenter::new(self.config.segmenter.clone())
            .segment(&self.generator, &story)
            .await;
        let characters = CharacterExtractor::new(self.config.extraction.clone())
            .extract(&self.generator, &story, Some(&theme))
            .await;
        let counts = characters.counts();

        info!(
            lines = lines.len(),
            characters = counts.total,
            "Story analyzed"
        );
        Ok(StoryAnalysis {
            theme,
            lines,
            characters,
            counts,
        })
    }

    /// Build one prompt per scene line.
    ///
    /// Lines run concurrently up to `[prompt].concurrency`; output is ordered
    /// by line index. Cancelling `control` stops unstarted lines and keeps
    /// every prompt already built.
    #[instrument(skip_all, fields(lines = analysis.lines.len(), refine = self.refiner.is_some()))]
    pub async fn generate_prompts(&self, analysis: &StoryAnalysis, control: &RunControl) -> PromptRun {
        let resolver = CharacterResolver::new(self.config.extraction.max_side_per_line);
        let characters = analysis.characters.as_slice();

        let mut prompts: Vec<GeneratedPrompt> = stream::iter(&analysis.lines)
            .map(|line| self.prompt_for_line(line, characters, &resolver, control))
            .buffer_unordered(self.config.prompt.concurrency.max(1))
            .filter_map(|prompt| async move { prompt })
            .collect()
            .await;
        prompts.sort_by_key(|p| p.index);

        let run = PromptRun {
            prompts,
            cancelled: control.is_cancelled(),
            total_lines: analysis.lines.len(),
        };
        info!(
            built = run.prompts.len(),
            total = run.total_lines,
            cancelled = run.cancelled,
            "Prompt run finished"
        );
        run
    }

    async fn prompt_for_line(
        &self,
        line: &SceneLine,
        characters: &[Character],
        resolver: &CharacterResolver,
        control: &RunControl,
    ) -> Option<GeneratedPrompt> {
        if !control.checkpoint().await {
            debug!(index = line.index(), "Skipping line after cancellation");
            return None;
        }

        let cast = resolver.resolve(line.text(), characters);
        let prompt = self.assembler.prompt_for(cast.iter().copied(), line.text());
        let (prompt, refined) = match &self.refiner {
            Some(refiner) => {
                refiner
                    .refine(&self.generator, &prompt, line.text(), &cast)
                    .await
            }
            None => (prompt, false),
        };

        debug!(index = line.index(), cast = cast.len(), refined, "Built prompt");
        Some(GeneratedPrompt {
            index: *line.index(),
            line: line.text().clone(),
            prompt,
            cast: cast.iter().map(|c| c.name().clone()).collect(),
            refined,
        })
    }
}
