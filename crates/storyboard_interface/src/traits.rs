//! Generation capability trait.

use async_trait::async_trait;
use std::sync::Arc;
use storyboard_core::GenerateRequest;
use storyboard_error::GenerationResult;

/// Core trait every text-generation backend implements.
///
/// Calls are expected to be deterministic at low temperature. Failures are
/// reported as `GenerationError`s whose kind tells the retry layer whether the
/// call is worth repeating.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for the request.
    async fn generate(&self, req: &GenerateRequest) -> GenerationResult<String>;

    /// Provider name (e.g., "longcat", "offline").
    fn provider_name(&self) -> &'static str;

    /// Model identifier.
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<G> TextGenerator for Arc<G>
where
    G: TextGenerator + ?Sized,
{
    async fn generate(&self, req: &GenerateRequest) -> GenerationResult<String> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<G> TextGenerator for Box<G>
where
    G: TextGenerator + ?Sized,
{
    async fn generate(&self, req: &GenerateRequest) -> GenerationResult<String> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
