//! Résumé analysis — builds the prompt, makes the single model call and pulls
//! a JSON object out of whatever text comes back.
//!
//! All model calls go through `llm_client`; nothing here talks HTTP.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm_client::{LlmError, TextGenerator};

pub mod handlers;
pub mod prompts;
pub mod result;

pub use result::AnalysisResult;

/// Shown to the user for every analysis failure. Details stay in the logs.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Sorry, the analysis could not be completed. Please try again later or upload a different file.";

// ────────────────────────────────────────────────────────────────────────────
// Request model
// ────────────────────────────────────────────────────────────────────────────

/// Language the report narrative is written in. Independent of the CV's own language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ReportLanguage {
    #[default]
    English,
    German,
    French,
    Italian,
    Russian,
    Turkish,
    Spanish,
}

impl ReportLanguage {
    /// Every selectable language, in menu order.
    pub const ALL: [ReportLanguage; 7] = [
        ReportLanguage::English,
        ReportLanguage::German,
        ReportLanguage::French,
        ReportLanguage::Italian,
        ReportLanguage::Russian,
        ReportLanguage::Turkish,
        ReportLanguage::Spanish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportLanguage::English => "English",
            ReportLanguage::German => "German",
            ReportLanguage::French => "French",
            ReportLanguage::Italian => "Italian",
            ReportLanguage::Russian => "Russian",
            ReportLanguage::Turkish => "Turkish",
            ReportLanguage::Spanish => "Spanish",
        }
    }
}

impl fmt::Display for ReportLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unsupported report language '{0}'")]
pub struct UnknownLanguage(pub String);

impl FromStr for ReportLanguage {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ReportLanguage::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownLanguage(wanted.to_string()))
    }
}

/// One analysis submission. Built per user action and dropped after the call.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    text: String,
    report_language: ReportLanguage,
}

impl AnalysisRequest {
    /// Returns `None` when `text` is blank; there is nothing to analyze.
    pub fn new(text: String, report_language: ReportLanguage) -> Option<Self> {
        (!text.trim().is_empty()).then_some(Self {
            text,
            report_language,
        })
    }

    /// Same text, different report language.
    pub fn with_language(self, report_language: ReportLanguage) -> Self {
        Self {
            report_language,
            ..self
        }
    }

    pub fn report_language(&self) -> ReportLanguage {
        self.report_language
    }

    pub fn prompt(&self) -> String {
        prompts::build_prompt(&self.text, self.report_language)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Failures
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AnalysisFailure {
    #[error("model reply contained no JSON object")]
    NoJsonFound,

    #[error("model reply contained malformed JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("model call failed: {0}")]
    Transport(#[from] LlmError),
}

impl AnalysisFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisFailure::NoJsonFound => "no_json_found",
            AnalysisFailure::InvalidJson(_) => "invalid_json",
            AnalysisFailure::Transport(_) => "transport_failure",
        }
    }

    /// The same generic message for every kind; raw model output and
    /// provider errors are never shown to the user.
    pub fn user_message(&self) -> &'static str {
        ANALYSIS_FAILED_MESSAGE
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Analysis client
// ────────────────────────────────────────────────────────────────────────────

/// Sends `prompt` to the model once and parses the reply.
pub async fn analyze(
    generator: &dyn TextGenerator,
    prompt: &str,
) -> Result<AnalysisResult, AnalysisFailure> {
    debug!(model = generator.model(), prompt_chars = prompt.len(), "Requesting analysis");

    let raw = generator.generate(prompt).await?;

    parse_analysis(&raw).inspect_err(|e| {
        warn!(kind = e.kind(), reply_chars = raw.len(), "Could not parse model reply: {e}");
    })
}

/// Parses the JSON object embedded in a raw model reply. No schema check is
/// made beyond "is this valid JSON".
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, AnalysisFailure> {
    let span = extract_json_span(raw).ok_or(AnalysisFailure::NoJsonFound)?;
    let value: serde_json::Value = serde_json::from_str(span)?;
    Ok(AnalysisResult::new(value))
}

/// Returns the text from the first `{` through the last `}`.
///
/// Greedy on purpose: markdown fences and preambles around the object are
/// dropped, but braces in prose outside the object end up inside the span.
pub fn extract_json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}
