//! OpenRouter-backed embedding and generation delegates.
//!
//! Both delegates treat the remote service as unreliable: any failure
//! (connect error, timeout, non-2xx status, malformed body) is logged and
//! recovered locally. The embedder falls back to [`HashEmbedder`]; the
//! generator returns an error that the answer composer converts into its
//! deterministic fallback. Embedding or answering therefore never aborts an
//! indexing or query operation because of the network.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::embedding::{EmbeddingProvider, HashEmbedder};
use crate::error::{KbError, Result};
use crate::generation::GenerationProvider;

/// The default OpenRouter API base URL.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// The default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "openai/text-embedding-3-small";

/// The default chat model for answer generation.
const DEFAULT_CHAT_MODEL: &str = "openrouter/auto";

/// Configuration for the OpenRouter delegates.
///
/// All connection parameters are explicit constructor inputs; nothing is read
/// from process-wide state, so several independently configured knowledge
/// bases can coexist in one process.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// Bearer token for the API.
    pub api_key: String,
    /// API base URL (override for self-hosted gateways and tests).
    pub base_url: String,
    /// Model used for `/embeddings` requests.
    pub embedding_model: String,
    /// Model used for `/chat/completions` requests.
    pub chat_model: String,
    /// Input is truncated to this many characters before embedding.
    pub max_input_chars: usize,
    /// Request timeout for embedding calls.
    pub embed_timeout: Duration,
    /// Request timeout for completion calls.
    pub generate_timeout: Duration,
    /// Completion token budget.
    pub max_tokens: u32,
    /// Completion sampling temperature.
    pub temperature: f32,
}

impl OpenRouterConfig {
    /// Create a config with the given API key and default endpoints, models,
    /// and timeouts.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENROUTER_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            max_input_chars: 8000,
            embed_timeout: Duration::from_secs(30),
            generate_timeout: Duration::from_secs(60),
            max_tokens: 1000,
            temperature: 0.7,
        }
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the embedding model.
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Override the chat model.
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }
}

/// Truncate text to at most `max_chars` characters on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

// ── Embedding delegate ─────────────────────────────────────────────

/// An [`EmbeddingProvider`] that delegates to the OpenRouter embeddings API
/// and fails closed onto [`HashEmbedder`].
///
/// Reports the fallback's dimensionality so vectors from both paths stay
/// comparable in one store.
pub struct OpenRouterEmbedder {
    client: reqwest::Client,
    config: OpenRouterConfig,
    fallback: HashEmbedder,
}

impl OpenRouterEmbedder {
    /// Create a new delegate with the given config and fallback embedder.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::Config`] if the API key is empty or the HTTP
    /// client cannot be constructed.
    pub fn new(config: OpenRouterConfig, fallback: HashEmbedder) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(KbError::Config("OpenRouter API key must not be empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.embed_timeout)
            .build()
            .map_err(|e| KbError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config, fallback })
    }

    /// Request an embedding from the remote service.
    async fn embed_remote(&self, text: &str) -> Result<Vec<f32>> {
        let input = truncate_chars(text, self.config.max_input_chars);
        let request = EmbeddingRequest { model: &self.config.embedding_model, input };

        debug!(
            provider = "OpenRouter",
            model = %self.config.embedding_model,
            input_len = input.len(),
            "requesting embedding"
        );

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| KbError::Embedding {
                provider: "OpenRouter".into(),
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(KbError::Embedding {
                provider: "OpenRouter".into(),
                message: format!("API returned {status}"),
            });
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| KbError::Embedding {
            provider: "OpenRouter".into(),
            message: format!("failed to parse response: {e}"),
        })?;

        body.data.into_iter().next().map(|d| d.embedding).ok_or_else(|| KbError::Embedding {
            provider: "OpenRouter".into(),
            message: "API returned no embeddings".into(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenRouterEmbedder {
    /// Embed text remotely, falling back to the hash embedding on any
    /// capability failure. This method never returns an error for remote
    /// faults; the failure is only logged.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match self.embed_remote(text).await {
            Ok(embedding) => Ok(embedding),
            Err(e) => {
                warn!(provider = "OpenRouter", error = %e, "embedding failed, using hash fallback");
                Ok(self.fallback.embed_text(text))
            }
        }
    }

    fn dimensions(&self) -> usize {
        self.fallback.dimensions()
    }
}

// ── Generation delegate ────────────────────────────────────────────

/// A [`GenerationProvider`] backed by the OpenRouter chat completions API.
pub struct OpenRouterGenerator {
    client: reqwest::Client,
    config: OpenRouterConfig,
}

impl OpenRouterGenerator {
    /// System message sent with every completion request.
    const SYSTEM_PROMPT: &'static str =
        "You are a helpful AI assistant with access to a knowledge base.";

    /// Create a new generator with the given config.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::Config`] if the API key is empty or the HTTP
    /// client cannot be constructed.
    pub fn new(config: OpenRouterConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(KbError::Config("OpenRouter API key must not be empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.generate_timeout)
            .build()
            .map_err(|e| KbError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl GenerationProvider for OpenRouterGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages: vec![
                ChatMessage { role: "system", content: Self::SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(
            provider = "OpenRouter",
            model = %self.config.chat_model,
            prompt_len = prompt.len(),
            "requesting completion"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| KbError::Generation {
                provider: "OpenRouter".into(),
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(KbError::Generation {
                provider: "OpenRouter".into(),
                message: format!("API returned {status}"),
            });
        }

        let body: ChatResponse = response.json().await.map_err(|e| KbError::Generation {
            provider: "OpenRouter".into(),
            message: format!("failed to parse response: {e}"),
        })?;

        body.choices.into_iter().next().map(|c| c.message.content).ok_or_else(|| {
            KbError::Generation {
                provider: "OpenRouter".into(),
                message: "API returned no choices".into(),
            }
        })
    }
}
