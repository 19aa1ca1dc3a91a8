//! Model-id routing across the configured providers.
use async_trait::async_trait;
use promptline_core::{GenerationClient, GenerationError, GenerationRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::http::build_http_client;
use crate::providers::{AnthropicClient, GeminiClient, OpenAiClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Anthropic,
    Perplexity,
}

impl ProviderKind {
    /// Provider family of a model id, by prefix.
    pub fn for_model(model_id: &str) -> Option<Self> {
        const OPENAI_PREFIXES: [&str; 5] = ["gpt-", "o1", "o3", "o4", "chatgpt-"];

        if model_id.starts_with("gemini-") {
            Some(Self::Gemini)
        } else if model_id.starts_with("claude-") {
            Some(Self::Anthropic)
        } else if model_id.starts_with("sonar") {
            Some(Self::Perplexity)
        } else if OPENAI_PREFIXES.iter().any(|p| model_id.starts_with(p)) {
            Some(Self::OpenAi)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Perplexity => "perplexity",
        }
    }
}

/// Credentials per provider. A missing key leaves that provider out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderKeys {
    pub gemini: Option<String>,
    pub openai: Option<String>,
    pub anthropic: Option<String>,
    pub perplexity: Option<String>,
}

/// Dispatches each request to the provider owning its model id.
#[derive(Default)]
pub struct ModelRouter {
    gemini: Option<GeminiClient>,
    openai: Option<OpenAiClient>,
    anthropic: Option<AnthropicClient>,
    perplexity: Option<OpenAiClient>,
}

impl ModelRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every provider that has a non-blank key, sharing one HTTP
    /// client with the given timeout.
    pub fn from_keys(keys: &ProviderKeys, timeout: Duration) -> Result<Self, GenerationError> {
        let http = build_http_client(timeout)?;
        let key = |k: &Option<String>| k.as_ref().filter(|k| !k.trim().is_empty()).cloned();

        let mut router = Self::new();
        if let Some(k) = key(&keys.gemini) {
            router = router.with_gemini(GeminiClient::new(k).with_http_client(http.clone()));
        }
        if let Some(k) = key(&keys.openai) {
            router = router.with_openai(OpenAiClient::new(k).with_http_client(http.clone()));
        }
        if let Some(k) = key(&keys.anthropic) {
            router = router.with_anthropic(AnthropicClient::new(k).with_http_client(http.clone()));
        }
        if let Some(k) = key(&keys.perplexity) {
            router = router.with_perplexity(OpenAiClient::perplexity(k).with_http_client(http));
        }

        tracing::info!(providers = ?router.configured(), "model router ready");
        Ok(router)
    }

    pub fn with_gemini(mut self, client: GeminiClient) -> Self {
        self.gemini = Some(client);
        self
    }

    pub fn with_openai(mut self, client: OpenAiClient) -> Self {
        self.openai = Some(client);
        self
    }

    pub fn with_anthropic(mut self, client: AnthropicClient) -> Self {
        self.anthropic = Some(client);
        self
    }

    pub fn with_perplexity(mut self, client: OpenAiClient) -> Self {
        self.perplexity = Some(client);
        self
    }

    pub fn configured(&self) -> Vec<ProviderKind> {
        [
            (ProviderKind::Gemini, self.gemini.is_some()),
            (ProviderKind::OpenAi, self.openai.is_some()),
            (ProviderKind::Anthropic, self.anthropic.is_some()),
            (ProviderKind::Perplexity, self.perplexity.is_some()),
        ]
        .into_iter()
        .filter_map(|(kind, present)| present.then_some(kind))
        .collect()
    }

    fn route(&self, model_id: &str) -> Option<&dyn GenerationClient> {
        match ProviderKind::for_model(model_id)? {
            ProviderKind::Gemini => self.gemini.as_ref().map(|c| c as &dyn GenerationClient),
            ProviderKind::OpenAi => self.openai.as_ref().map(|c| c as &dyn GenerationClient),
            ProviderKind::Anthropic => self.anthropic.as_ref().map(|c| c as &dyn GenerationClient),
            ProviderKind::Perplexity => self.perplexity.as_ref().map(|c| c as &dyn GenerationClient),
        }
    }
}

#[async_trait]
impl GenerationClient for ModelRouter {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let client = self
            .route(&request.model_id)
            .ok_or_else(|| GenerationError::UnsupportedModel(request.model_id.clone()))?;
        client.generate(request).await
    }

    fn supports(&self, model_id: &str) -> bool {
        self.route(model_id).is_some()
    }
}
