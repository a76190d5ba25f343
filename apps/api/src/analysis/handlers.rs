//! Axum route handlers for the Resume Analysis API.
//!
//! Each request drives its own `AnalysisSession`; nothing is kept between requests.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{ReportLanguage, UnknownLanguage};
use crate::errors::AppError;
use crate::extraction::PageSource;
use crate::report::ReportBlock;
use crate::session::AnalysisSession;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<ReportLanguage>,
    pub default: ReportLanguage,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub page_count: usize,
    pub char_count: usize,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub text: String,
    pub report_language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub session_id: Uuid,
    pub report_language: ReportLanguage,
    pub generated_at: DateTime<Utc>,
    pub blocks: Vec<ReportBlock>,
    pub markdown: String,
}

/// Fields pulled out of a multipart upload.
struct PdfUpload {
    pdf: Bytes,
    report_language: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/languages
pub async fn handle_languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: ReportLanguage::ALL.to_vec(),
        default: ReportLanguage::default(),
    })
}

/// POST /api/v1/resume/extract
///
/// Extracts the text of an uploaded PDF without analyzing it. Clients can
/// hold on to the text and call `analyze-text` as often as they like.
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let upload = read_upload(multipart).await?;

    let mut session = AnalysisSession::new();
    session.upload(upload.pdf);
    let session = extract_blocking(session, state.pages.clone()).await?;

    let extracted = session
        .extracted()
        .ok_or_else(|| anyhow::anyhow!("extraction finished without text"))?;

    Ok(Json(ExtractResponse {
        page_count: extracted.page_count,
        char_count: extracted.text.chars().count(),
        text: extracted.text.clone(),
    }))
}

/// POST /api/v1/resume/analyze
///
/// Full pipeline: upload → extract → select language → analyze → render.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    let language = parse_language(upload.report_language.as_deref())?;

    let mut session = AnalysisSession::new();
    session.upload(upload.pdf);
    let session = extract_blocking(session, state.pages.clone()).await?;

    run_analysis(&state, session, language).await
}

/// POST /api/v1/resume/analyze-text
///
/// Analyzes text that was already extracted, e.g. to retry or to switch the
/// report language without uploading the PDF again.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeTextRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let language = parse_language(request.report_language.as_deref())?;

    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let session = AnalysisSession::from_text(request.text)?;
    run_analysis(&state, session, language).await
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn run_analysis(
    state: &AppState,
    mut session: AnalysisSession,
    language: ReportLanguage,
) -> Result<Json<AnalysisResponse>, AppError> {
    session.select_language(language)?;
    session.analyze(state.generator.as_ref()).await?;

    let report = session
        .report()
        .ok_or_else(|| anyhow::anyhow!("analysis finished without a report"))?;

    Ok(Json(AnalysisResponse {
        session_id: session.id(),
        report_language: language,
        generated_at: Utc::now(),
        blocks: report.blocks.clone(),
        markdown: report.to_markdown(),
    }))
}

/// PDF parsing is CPU-bound, so it runs off the async workers.
async fn extract_blocking(
    mut session: AnalysisSession,
    pages: Arc<dyn PageSource>,
) -> Result<AnalysisSession, AppError> {
    let outcome = tokio::task::spawn_blocking(move || {
        session.extract(pages.as_ref()).map(|()| session)
    })
    .await
    .map_err(|e| anyhow::anyhow!("extraction task failed: {e}"))?;

    Ok(outcome?)
}

fn parse_language(raw: Option<&str>) -> Result<ReportLanguage, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(ReportLanguage::default()),
        Some(name) => name
            .parse()
            .map_err(|e: UnknownLanguage| AppError::Validation(e.to_string())),
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<PdfUpload, AppError> {
    let mut pdf = None;
    let mut report_language = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                if !is_pdf(field.content_type(), field.file_name()) {
                    return Err(AppError::Validation(
                        "Only PDF files are supported".to_string(),
                    ));
                }
                pdf = Some(field.bytes().await?);
            }
            Some("report_language") => {
                report_language = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let pdf = pdf.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;
    if pdf.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    Ok(PdfUpload {
        pdf,
        report_language,
    })
}

fn is_pdf(content_type: Option<&str>, file_name: Option<&str>) -> bool {
    let by_type = content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"));
    let by_name = file_name.is_some_and(|n| n.to_ascii_lowercase().ends_with(".pdf"));
    by_type || by_name
}
