//! Chat-completions HTTP client.

use super::{ChatMessage, ChatRequest, ChatResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use storyboard_core::{GenerateRequest, Role};
use storyboard_error::{GenerationError, GenerationErrorKind, GenerationResult};
use storyboard_interface::TextGenerator;
use storyboard_rate_limit::{CredentialPool, CredentialStrategy, GenerationConfig, RotateByAttempt};
use tracing::{debug, instrument, warn};

/// Client for OpenAI-compatible chat-completions endpoints.
///
/// The API key for each call is picked by a [`CredentialStrategy`] from the
/// request's attempt ordinal, so retries rotate keys without shared state.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleClient {
    client: Client,
    endpoint: String,
    model: String,
    system_prompt: Option<String>,
    credentials: CredentialPool,
    strategy: Arc<dyn CredentialStrategy>,
    provider: &'static str,
}

impl OpenAICompatibleClient {
    /// Creates a client for `endpoint` using `credentials`.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        credentials: CredentialPool,
        timeout: Duration,
    ) -> GenerationResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            GenerationError::new(GenerationErrorKind::Transport(format!(
                "Failed to build HTTP client: {}",
                e
            )))
        })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            system_prompt: None,
            credentials,
            strategy: Arc::new(RotateByAttempt),
            provider: "longcat",
        })
    }

    /// Creates a client from configuration, reading keys from the environment.
    ///
    /// # Errors
    ///
    /// Returns `NoCredentials` when no key variable is set.
    pub fn from_config(config: &GenerationConfig) -> GenerationResult<Self> {
        let credentials = CredentialPool::from_env(&config.api_key_env_prefix, config.max_keys);
        if credentials.is_empty() {
            warn!(
                prefix = %config.api_key_env_prefix,
                "No API keys found in environment"
            );
            return Err(GenerationError::new(GenerationErrorKind::NoCredentials));
        }

        Ok(Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            credentials,
            Duration::from_secs(config.timeout_secs),
        )?
        .with_system_prompt(config.system_prompt.clone()))
    }

    /// System message prepended to requests that carry none.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        self.system_prompt = (!prompt.trim().is_empty()).then_some(prompt);
        self
    }

    /// Replace the key-selection strategy.
    pub fn with_strategy(mut self, strategy: Arc<dyn CredentialStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Label reported by `provider_name`.
    pub fn with_provider_name(mut self, provider: &'static str) -> Self {
        self.provider = provider;
        self
    }

    /// Convert a generation request into the wire body.
    pub fn to_chat_request(&self, req: &GenerateRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(req.messages.len() + 1);
        let has_system = req.messages.iter().any(|m| m.role == Role::System);
        if let (Some(system), false) = (&self.system_prompt, has_system) {
            messages.push(ChatMessage {
                role: Role::System.as_str().to_string(),
                content: Some(system.clone()),
            });
        }
        messages.extend(req.messages.iter().map(ChatMessage::from));

        ChatRequest {
            model: req.model.clone().unwrap_or_else(|| self.model.clone()),
            messages,
            temperature: req.temperature,
            max_tokens: req.max_tokens,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAICompatibleClient {
    #[instrument(skip(self, req), fields(provider = self.provider, model = %self.model, attempt = req.attempt))]
    async fn generate(&self, req: &GenerateRequest) -> GenerationResult<String> {
        let key = self
            .strategy
            .select(&self.credentials, req.attempt)
            .ok_or_else(|| GenerationError::new(GenerationErrorKind::NoCredentials))?;

        let body = self.to_chat_request(req);
        debug!(endpoint = %self.endpoint, messages = body.messages().len(), "Sending chat-completions request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                GenerationError::new(GenerationErrorKind::Transport(format!(
                    "Request failed: {}",
                    e
                )))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::from_status(status.as_u16(), error_text));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            GenerationError::new(GenerationErrorKind::MalformedResponse(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        let content = chat.first_content().ok_or_else(|| {
            GenerationError::new(GenerationErrorKind::MalformedResponse(
                "Response has no choices[0].message.content".to_string(),
            ))
        })?;

        let text = strip_code_fences(content);
        debug!(chars = text.len(), "Received completion");
        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Remove Markdown code fences and surrounding whitespace.
///
/// ```
/// use storyboard_models::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
/// assert_eq!(strip_code_fences("  plain  "), "plain");
/// ```
pub fn strip_code_fences(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
