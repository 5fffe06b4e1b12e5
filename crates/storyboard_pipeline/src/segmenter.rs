//! Scene-line segmentation.
//!
//! Two tiers: a model call asked to split the story within the word window,
//! and a deterministic paragraph splitter used whenever that call fails or
//! returns too few usable lines.

use crate::{extract_json, parse_json};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use storyboard_core::{GenerateRequest, SceneLine, StoryText, word_count};
use storyboard_interface::TextGenerator;
use storyboard_rate_limit::SegmenterConfig;
use tracing::{debug, info, instrument, warn};

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("Valid paragraph regex"));

/// Closing characters allowed after terminal punctuation.
const CLOSERS: &[char] = &['"', '\'', ')', ']', '”', '’', '»'];

fn ends_with_any(word: &str, marks: &[char]) -> bool {
    word.trim_end_matches(CLOSERS)
        .chars()
        .last()
        .is_some_and(|c| marks.contains(&c))
}

/// Split words into runs ending at words that close with one of `marks`.
fn split_after<'a>(words: &[&'a str], marks: &[char]) -> Vec<Vec<&'a str>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for &word in words {
        current.push(word);
        if ends_with_any(word, marks) {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Splits stories into scene lines within a word-count window.
#[derive(Debug, Clone, Default, derive_getters::Getters)]
pub struct TextSegmenter {
    config: SegmenterConfig,
}

impl TextSegmenter {
    /// Create a segmenter with the given window.
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Segment a story, preferring the model and falling back deterministically.
    ///
    /// Never fails: any generation or parse error selects the fallback.
    #[instrument(skip_all, fields(story_chars = story.as_str().len(), provider = generator.provider_name()))]
    pub async fn segment<G>(&self, generator: &G, story: &StoryText) -> Vec<SceneLine>
    where
        G: TextGenerator + ?Sized,
    {
        let request = GenerateRequest::from_prompt(
            self.instruction(story.as_str()),
            self.config.temperature,
            self.config.max_tokens,
        );

        match generator.generate(&request).await {
            Ok(response) => match self.parse_response(&response) {
                Some(lines) => {
                    info!(lines = lines.len(), "Segmented story with model");
                    return SceneLine::sequence(lines);
                }
                None => warn!("Model segmentation unusable, using paragraph fallback"),
            },
            Err(e) => warn!(error = %e, "Segmentation call failed, using paragraph fallback"),
        }

        let lines = self.fallback(story.as_str());
        info!(lines = lines.len(), "Segmented story with paragraph fallback");
        SceneLine::sequence(lines)
    }

    /// Instruction sent to the model.
    pub fn instruction(&self, story: &str) -> String {
        let c = &self.config;
        format!(
            "Split the story below into scene lines.\n\
             Rules:\n\
             - Every line has {min}-{max} words; aim for {tmin}-{tmax}.\n\
             - Break at sentence-final punctuation (. ! ? ;) first, then at commas.\n\
             - Merge any fragment shorter than {min} words into a neighbouring line.\n\
             - Keep the original wording and narrative order.\n\
             Return ONLY a JSON array of strings.\n\n\
             STORY:\n{story}",
            min = c.min_words,
            max = c.max_words,
            tmin = c.target_min_words,
            tmax = c.target_max_words,
            story = story,
        )
    }

    /// Validate a model response.
    ///
    /// Keeps string entries inside the word window and returns `None` unless
    /// at least `min_viable_lines` survive.
    pub fn parse_response(&self, response: &str) -> Option<Vec<String>> {
        let json = extract_json(response)
            .map_err(|e| debug!(error = %e, "No JSON array in segmentation response"))
            .ok()?;
        let values: Vec<Value> = parse_json(&json)
            .map_err(|e| debug!(error = %e, "Segmentation response is not a JSON array"))
            .ok()?;

        let lines: Vec<String> = values
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.split_whitespace().collect::<Vec<_>>().join(" ")),
                _ => None,
            })
            .filter(|line| {
                let n = word_count(line);
                n >= self.config.min_words && n <= self.config.max_words
            })
            .collect();

        if lines.len() < self.config.min_viable_lines {
            debug!(
                valid = lines.len(),
                required = self.config.min_viable_lines,
                "Too few valid lines from model"
            );
            return None;
        }
        Some(lines)
    }

    /// Deterministic paragraph-based segmentation.
    ///
    /// Paragraphs are separated by blank lines. Short paragraphs accumulate in
    /// a buffer that is flushed once it reaches `target_min_words`; a pending
    /// buffer is prefixed to the next long paragraph; a trailing buffer below
    /// `min_words` is discarded. Paragraphs longer than `max_words` are split
    /// at sentence ends, then commas, and packed back into lines.
    ///
    /// A clause longer than `max_words` with no punctuation to split on is
    /// emitted as-is.
    pub fn fallback(&self, text: &str) -> Vec<String> {
        let min = self.config.min_words;
        let mut out = Vec::new();
        let mut buffer: Vec<&str> = Vec::new();

        for paragraph in PARAGRAPH_BREAK.split(text) {
            let words: Vec<&str> = paragraph.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }

            if words.len() >= min {
                let mut combined = std::mem::take(&mut buffer);
                combined.extend(words);
                out.extend(self.pack(&combined));
            } else {
                buffer.extend(words);
                if buffer.len() >= self.config.target_min_words {
                    out.extend(self.pack(&std::mem::take(&mut buffer)));
                }
            }
        }

        if buffer.len() >= min {
            out.extend(self.pack(&buffer));
        } else if !buffer.is_empty() {
            debug!(words = buffer.len(), "Discarding short trailing fragment");
        }

        out
    }

    /// Pack one run of words into lines within the window.
    fn pack(&self, words: &[&str]) -> Vec<String> {
        let c = &self.config;
        if words.len() <= c.max_words {
            return vec![words.join(" ")];
        }

        // Sentences first, then commas for sentences still too long.
        let units: Vec<Vec<&str>> = split_after(words, &['.', '!', '?', ';'])
            .into_iter()
            .flat_map(|sentence| {
                if sentence.len() > c.max_words {
                    split_after(&sentence, &[',', ':'])
                } else {
                    vec![sentence]
                }
            })
            .collect();

        let mut lines: Vec<Vec<&str>> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for unit in units {
            let combined = current.len() + unit.len();
            if current.is_empty()
                || combined <= c.target_max_words
                || (current.len() < c.min_words && combined <= c.max_words)
            {
                current.extend(unit);
            } else {
                lines.push(std::mem::replace(&mut current, unit));
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }

        self.absorb_short(&mut lines);
        lines.into_iter().map(|l| l.join(" ")).collect()
    }

    /// Merge lines below `min_words` into a neighbour.
    fn absorb_short(&self, lines: &mut Vec<Vec<&str>>) {
        let (min, max) = (self.config.min_words, self.config.max_words);

        while lines.len() > 1 {
            let Some(i) = lines.iter().position(|l| l.len() < min) else {
                break;
            };

            let prev_fits = i > 0 && lines[i - 1].len() + lines[i].len() <= max;
            let next_fits = i + 1 < lines.len() && lines[i + 1].len() + lines[i].len() <= max;

            let short = lines.remove(i);
            if prev_fits {
                lines[i - 1].extend(short);
            } else if next_fits {
                let mut merged = short;
                merged.extend(lines[i].drain(..));
                lines[i] = merged;
            } else {
                // Neither neighbour has room: join the shorter one, then split the
                // result near its middle so both halves stay inside the window.
                let target = match (i.checked_sub(1), (i < lines.len()).then_some(i)) {
                    (Some(p), Some(n)) if lines[n].len() < lines[p].len() => n,
                    (Some(p), _) => p,
                    (None, Some(n)) => n,
                    (None, None) => return,
                };
                let merged = if target < i {
                    let mut merged = std::mem::take(&mut lines[target]);
                    merged.extend(short);
                    merged
                } else {
                    let mut merged = short;
                    merged.extend(lines[target].drain(..));
                    merged
                };

                match self.rebalance(&merged) {
                    Some((left, right)) => {
                        lines[target] = right;
                        lines.insert(target, left);
                    }
                    None => lines[target] = merged,
                }
            }
        }
    }

    /// Split an overlong run into two window-sized halves, preferring a
    /// punctuation boundary nearest the middle.
    fn rebalance<'a>(&self, words: &[&'a str]) -> Option<(Vec<&'a str>, Vec<&'a str>)> {
        let (min, max) = (self.config.min_words, self.config.max_words);
        let n = words.len();
        if n <= max || n > 2 * max {
            return None;
        }

        let middle = n / 2;
        let valid = |cut: usize| cut >= min && n - cut >= min && cut <= max && n - cut <= max;
        let punctuated = (1..n)
            .filter(|&cut| valid(cut) && ends_with_any(words[cut - 1], &['.', '!', '?', ';', ',', ':']))
            .min_by_key(|&cut| cut.abs_diff(middle));
        let cut = punctuated.or_else(|| valid(middle).then_some(middle))?;

        Some((words[..cut].to_vec(), words[cut..].to_vec()))
    }
}

/// Segment a story with the default window.
///
/// Always returns a usable sequence; see [`TextSegmenter::segment`].
pub async fn segment_story<G>(generator: &G, story: &StoryText) -> Vec<SceneLine>
where
    G: TextGenerator + ?Sized,
{
    TextSegmenter::default().segment(generator, story).await
}
