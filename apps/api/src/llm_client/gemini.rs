//! Google Generative Language API backend (API key based).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{api_error, LlmError, TextGenerator};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// Default Gemini model when `LLM_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite";

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Joins the text parts of the first candidate. Gemini may split one
    /// reply across several parts.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_BASE}/{}:generateContent", self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey { provider: "gemini" })?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("content-type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &body.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        body.text().ok_or(LlmError::EmptyContent)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_embeds_model() {
        let client = GeminiClient::new(None, DEFAULT_MODEL.to_string()).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-lite:generateContent"
        );
    }

    #[test]
    fn test_request_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: "analyze this" }],
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "analyze this");
    }

    #[test]
    fn test_response_text_joins_parts() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "{\"language\": "}, {"text": "\"German\"}"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 8}
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().unwrap(), "{\"language\": \"German\"}");
        assert_eq!(response.usage_metadata.unwrap().prompt_token_count, 120);
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(response.text().is_none());
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let client = GeminiClient::new(None, DEFAULT_MODEL.to_string()).unwrap();
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey { provider: "gemini" }));
    }
}
