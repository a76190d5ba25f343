/// LLM Client — the single point of entry for all model calls in resumex.
///
/// No other module may talk to a model provider directly. Callers hold an
/// `Arc<dyn TextGenerator>` built once at startup by [`build_generator`], so
/// tests can swap in a stand-in backend.
///
/// Every call is one complete, non-streamed request. There is no retry and no
/// client-side timeout: whatever the transport defaults to applies.
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{Config, LlmProvider};

pub mod gemini;

pub use gemini::GeminiClient;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Default Anthropic model when `LLM_MODEL` is not set.
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 8192;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("No API key configured for {provider}")]
    MissingApiKey { provider: &'static str },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A backend that turns one prompt into one complete text reply.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}

/// Builds the configured backend. Called once from `main`.
pub fn build_generator(config: &Config) -> Result<Arc<dyn TextGenerator>, LlmError> {
    let api_key = config.llm_api_key.clone();
    let model = config.llm_model.clone();

    let generator: Arc<dyn TextGenerator> = match config.llm_provider {
        LlmProvider::Gemini => Arc::new(GeminiClient::new(
            api_key,
            model.unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string()),
        )?),
        LlmProvider::Anthropic => Arc::new(AnthropicClient::new(
            api_key,
            model.unwrap_or_else(|| ANTHROPIC_DEFAULT_MODEL.to_string()),
        )?),
    };

    Ok(generator)
}

/// Maps a non-2xx response into `LlmError::Api`, keeping the provider's
/// own error message when the body carries one.
pub(crate) async fn api_error(response: reqwest::Response) -> LlmError {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    LlmError::Api { status, message }
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic Messages API
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl AnthropicResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl AnthropicClient {
    pub fn new(api_key: Option<String>, model: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey {
                provider: "anthropic",
            })?;

        let request_body = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: AnthropicResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            body.usage.input_tokens, body.usage.output_tokens
        );

        body.text()
            .filter(|t| !t.trim().is_empty())
            .map(String::from)
            .ok_or(LlmError::EmptyContent)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test backend
// ────────────────────────────────────────────────────────────────────────────
