//! Tests for scene-line segmentation.

use proptest::prelude::*;
use std::sync::Mutex;
use storyboard_core::{GenerateRequest, StoryText};
use storyboard_error::{GenerationError, GenerationErrorKind, GenerationResult};
use storyboard_interface::TextGenerator;
use storyboard_pipeline::{TextSegmenter, segment_story};
use storyboard_rate_limit::SegmenterConfig;

/// Returns one canned response and remembers the prompt it was given.
struct Canned {
    response: GenerationResult<String>,
    seen: Mutex<Vec<String>>,
}

impl Canned {
    fn ok(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            response: Err(GenerationError::new(GenerationErrorKind::ServerError {
                status: 503,
                message: "unavailable".to_string(),
            })),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for Canned {
    async fn generate(&self, req: &GenerateRequest) -> GenerationResult<String> {
        self.seen.lock().unwrap().push(req.user_text());
        self.response.clone()
    }

    fn provider_name(&self) -> &'static str {
        "canned"
    }

    fn model_name(&self) -> &str {
        "canned-1"
    }
}

const VOCAB: &[&str] = &[
    "the", "rain", "Michael", "door", "slowly", "opens", "and", "she", "looks", "away", "phone",
    "rings", "night", "coffee", "falls", "kitchen", "quiet", "street", "light", "waits",
];

const TERMINATORS: &[&str] = &[".", "!", "?", ";"];

/// A sentence of 2-14 words, with occasional commas and a closing mark.
fn arb_sentence() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(
            (prop::sample::select(VOCAB), prop::bool::weighted(0.1)),
            2..15,
        ),
        prop::sample::select(TERMINATORS),
    )
        .prop_map(|(words, end)| {
            let last = words.len() - 1;
            words
                .into_iter()
                .enumerate()
                .map(|(i, (word, comma))| {
                    if i == last {
                        format!("{word}{end}")
                    } else if comma {
                        format!("{word},")
                    } else {
                        word.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
}

/// Up to six paragraphs of up to five sentences each.
fn arb_story() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::collection::vec(arb_sentence(), 1..6).prop_map(|s| s.join(" ")),
        1..7,
    )
    .prop_map(|paragraphs| paragraphs.join("\n\n"))
}

fn words(text: &str) -> usize {
    text.split_whitespace().count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn test_fallback_lines_stay_inside_window(story in arb_story()) {
        let lines = TextSegmenter::default().fallback(&story);

        if story.split("\n\n").any(|p| words(p) >= 8) {
            prop_assert!(!lines.is_empty(), "no lines for {:?}", story);
        }
        for line in &lines {
            let n = words(line);
            prop_assert!((8..=25).contains(&n), "{} words in {:?}", n, line);
        }
    }

    #[test]
    fn test_fallback_is_deterministic(story in arb_story()) {
        let segmenter = TextSegmenter::default();
        prop_assert_eq!(segmenter.fallback(&story), segmenter.fallback(&story));
    }

    #[test]
    fn test_fallback_keeps_narrative_order(story in arb_story()) {
        // Only a short trailing fragment may be dropped, so output is a prefix of the input.
        let joined = TextSegmenter::default().fallback(&story).join(" ");
        let original: Vec<&str> = story.split_whitespace().collect();
        let kept: Vec<&str> = joined.split_whitespace().collect();
        prop_assert!(kept.len() <= original.len());
        prop_assert_eq!(&original[..kept.len()], kept.as_slice());
    }
}

#[test]
fn test_short_sentences_merge_into_one_line() {
    let segmenter = TextSegmenter::default();
    let lines = segmenter.fallback("Time stops. The coffee mug falls. Rachel screams.");
    assert_eq!(lines, vec!["Time stops. The coffee mug falls. Rachel screams."]);

    let split = segmenter.fallback("Time stops.\n\nThe coffee mug falls.\n\nRachel screams.");
    assert_eq!(split, vec!["Time stops. The coffee mug falls. Rachel screams."]);
    assert!(!split.iter().any(|l| l == "Time stops."));
}

#[test]
fn test_short_trailing_fragment_is_discarded() {
    let segmenter = TextSegmenter::default();
    let lines = segmenter.fallback(
        "Michael walks into the kitchen and pours a cup of cold coffee.\n\nThe end.",
    );
    assert_eq!(
        lines,
        vec!["Michael walks into the kitchen and pours a cup of cold coffee."]
    );
    assert!(segmenter.fallback("").is_empty());
    assert!(segmenter.fallback("Too short.").is_empty());
}

#[test]
fn test_buffered_paragraphs_flush_at_twelve_words() {
    let segmenter = TextSegmenter::default();
    let lines = segmenter.fallback(
        "She waits by the door.\n\nThe phone rings twice.\n\nNobody answers it.\n\nRain falls.",
    );
    // 5 + 4 + 3 = 12 words flush; the last two words are dropped.
    assert_eq!(
        lines,
        vec!["She waits by the door. The phone rings twice. Nobody answers it."]
    );
}

#[test]
fn test_unpunctuated_overlong_paragraph_passes_through() {
    let segmenter = TextSegmenter::default();
    let story = vec!["word"; 30].join(" ");
    let lines = segmenter.fallback(&story);
    assert_eq!(lines.len(), 1);
    assert_eq!(words(&lines[0]), 30);
}

#[test]
fn test_long_paragraph_splits_at_sentences() {
    let segmenter = TextSegmenter::default();
    let story = "Michael opens the door of the quiet apartment and listens for a while. \
                 The hallway light flickers twice before it finally goes dark again. \
                 Somewhere below a car alarm starts and stops without any warning.";
    let lines = segmenter.fallback(story);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("while."));
    assert!(lines.iter().all(|l| (8..=25).contains(&words(l))));
}

fn model_lines() -> Vec<&'static str> {
    vec![
        "Michael opens the door of the quiet apartment and listens.",
        "The hallway light flickers twice before it finally goes dark.",
        "Somewhere below a car alarm starts and stops without warning.",
        "Rachel calls his name from the kitchen, her voice unsteady.",
        "He drops his keys on the table and walks toward her.",
        "The coffee mug slips from her hand and shatters on the tiles.",
    ]
}

fn story() -> StoryText {
    StoryText::new(model_lines().join(" "), 10_000).unwrap()
}

#[tokio::test]
async fn test_model_lines_are_used_when_viable() {
    let response = serde_json::to_string(&model_lines()).unwrap();
    let generator = Canned::ok(&format!("```json\n{response}\n```"));

    let lines = segment_story(&generator, &story()).await;

    assert_eq!(lines.len(), 6);
    assert_eq!(*lines[0].index(), 1);
    assert_eq!(*lines[5].index(), 6);
    assert_eq!(lines[3].text(), model_lines()[3]);
    assert_eq!(*lines[0].word_count(), 10);

    let prompt = generator.seen.lock().unwrap()[0].clone();
    assert!(prompt.contains("8-25 words"));
    assert!(prompt.contains("Rachel calls his name"));
}

#[tokio::test]
async fn test_out_of_window_model_lines_are_filtered() {
    let mut lines = model_lines();
    lines.push("Too short.");
    let response = serde_json::to_string(&lines).unwrap();
    let generator = Canned::ok(&response);

    let result = segment_story(&generator, &story()).await;
    assert_eq!(result.len(), 6);
    assert!(result.iter().all(|l| l.text() != "Too short."));
}

#[tokio::test]
async fn test_too_few_viable_lines_fall_back() {
    let response = serde_json::to_string(&[
        model_lines()[0],
        model_lines()[1],
        model_lines()[2],
        model_lines()[3],
        "Short.",
        "Also short.",
    ])
    .unwrap();
    let generator = Canned::ok(&response);
    let story = story();

    let lines = segment_story(&generator, &story).await;
    let expected = TextSegmenter::default().fallback(story.as_str());

    let texts: Vec<String> = lines.iter().map(|l| l.text().clone()).collect();
    assert_eq!(texts, expected);
}

#[tokio::test]
async fn test_generation_failure_falls_back() {
    let generator = Canned::failing();
    let story = StoryText::new("Time stops. The coffee mug falls. Rachel screams.", 1_000).unwrap();

    let lines = segment_story(&generator, &story).await;

    assert_eq!(lines.len(), 1);
    assert_eq!(*lines[0].word_count(), 9);
}

#[tokio::test]
async fn test_non_json_response_falls_back() {
    let generator = Canned::ok("I would split it like this: first the door, then the light.");
    let lines = segment_story(&generator, &story()).await;
    assert!(!lines.is_empty());
    assert!(lines.iter().all(|l| (8..=25).contains(l.word_count())));
}

#[tokio::test]
async fn test_custom_window_is_respected() {
    let segmenter = TextSegmenter::new(SegmenterConfig {
        min_viable_lines: 2,
        ..SegmenterConfig::default()
    });
    let response = serde_json::to_string(&model_lines()[..2]).unwrap();
    let generator = Canned::ok(&response);

    let lines = segmenter.segment(&generator, &story()).await;
    assert_eq!(lines.len(), 2);
}
