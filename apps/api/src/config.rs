use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Which hosted model family serves analysis requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Gemini,
    Anthropic,
}

impl LlmProvider {
    /// Environment variable holding the API key for this provider.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "anthropic" | "claude" => Ok(LlmProvider::Anthropic),
            other => bail!("Unsupported LLM_PROVIDER '{other}' (expected 'gemini' or 'anthropic')"),
        }
    }
}

/// Application configuration loaded from environment variables.
///
/// The API key is deliberately optional here: a missing key is reported once at
/// startup and then surfaces as a failed analysis on every request.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_provider: LlmProvider,
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_provider: LlmProvider = optional_env("LLM_PROVIDER")
            .unwrap_or_else(|| "gemini".to_string())
            .parse()?;

        let llm_api_key = optional_env(llm_provider.api_key_var());

        let max_upload_mb = std::env::var("MAX_UPLOAD_MB")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<usize>()
            .context("MAX_UPLOAD_MB must be a whole number of megabytes")?;

        Ok(Config {
            llm_provider,
            llm_api_key,
            llm_model: optional_env("LLM_MODEL"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}

/// Reads an env var, treating unset and blank values the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
