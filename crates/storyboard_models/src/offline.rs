//! Backend that never reaches a model.

use async_trait::async_trait;
use storyboard_core::GenerateRequest;
use storyboard_error::{GenerationError, GenerationErrorKind, GenerationResult};
use storyboard_interface::TextGenerator;
use tracing::debug;

/// Generator whose every call fails with a transport error.
///
/// Used for `--offline` runs and tests: segmentation falls back to the
/// paragraph splitter, extraction yields an empty registry and the theme
/// keeps its defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, req: &GenerateRequest) -> GenerationResult<String> {
        debug!(messages = req.messages.len(), "Offline generator refusing request");
        Err(GenerationError::new(GenerationErrorKind::Transport(
            "offline".to_string(),
        )))
    }

    fn provider_name(&self) -> &'static str {
        "offline"
    }

    fn model_name(&self) -> &str {
        "none"
    }
}
