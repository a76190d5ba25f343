//! Analysis session — the upload → extract → choose language → analyze → display
//! flow as an explicit state machine.
//!
//! Events are applied one at a time. A failed extraction can only be left by
//! uploading again; a failed analysis keeps its request so the user can retry
//! or pick another language without re-uploading.

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::{self, AnalysisFailure, AnalysisRequest, ReportLanguage};
use crate::extraction::{self, ExtractedText, ExtractionFailure, PageSource};
use crate::llm_client::TextGenerator;
use crate::report::{self, ReportDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedStage {
    Extraction,
    Analysis,
}

#[derive(Debug)]
pub enum SessionState {
    Idle,
    FileUploaded {
        pdf: Bytes,
    },
    TextExtracted {
        extracted: ExtractedText,
    },
    LanguageSelected {
        request: AnalysisRequest,
    },
    /// Waiting on the model.
    Analyzing,
    Displayed {
        request: AnalysisRequest,
        report: ReportDocument,
    },
    Failed {
        stage: FailedStage,
        message: String,
        /// Present for analysis failures, so the same request can be re-sent.
        request: Option<AnalysisRequest>,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::FileUploaded { .. } => "file_uploaded",
            SessionState::TextExtracted { .. } => "text_extracted",
            SessionState::LanguageSelected { .. } => "language_selected",
            SessionState::Analyzing => "analyzing",
            SessionState::Displayed { .. } => "displayed",
            SessionState::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {event} while session is {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },

    #[error(transparent)]
    Extraction(#[from] ExtractionFailure),

    #[error(transparent)]
    Analysis(#[from] AnalysisFailure),
}

pub struct AnalysisSession {
    id: Uuid,
    state: SessionState,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
        }
    }

    /// Starts from text that was extracted earlier, skipping the upload.
    pub fn from_text(text: String) -> Result<Self, SessionError> {
        if text.trim().is_empty() {
            return Err(ExtractionFailure::NoText.into());
        }
        Ok(Self {
            id: Uuid::new_v4(),
            state: SessionState::TextExtracted {
                extracted: ExtractedText {
                    text,
                    page_count: 0,
                },
            },
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Extracted text, once extraction has succeeded.
    pub fn extracted(&self) -> Option<&ExtractedText> {
        match &self.state {
            SessionState::TextExtracted { extracted } => Some(extracted),
            _ => None,
        }
    }

    pub fn report(&self) -> Option<&ReportDocument> {
        match &self.state {
            SessionState::Displayed { report, .. } => Some(report),
            _ => None,
        }
    }

    /// Accepts a new PDF from any state, discarding whatever came before.
    pub fn upload(&mut self, pdf: Bytes) {
        debug!(session_id = %self.id, bytes = pdf.len(), from = self.state.name(), "PDF uploaded");
        self.state = SessionState::FileUploaded { pdf };
    }

    /// Reads the uploaded PDF. The bytes are consumed either way.
    pub fn extract(&mut self, pages: &dyn PageSource) -> Result<(), SessionError> {
        let pdf = match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::FileUploaded { pdf } => pdf,
            other => return Err(self.reject(other, "extract")),
        };

        match extraction::extract_with(pages, &pdf) {
            Ok(extracted) => {
                info!(
                    session_id = %self.id,
                    pages = extracted.page_count,
                    chars = extracted.text.len(),
                    "Text extracted"
                );
                self.state = SessionState::TextExtracted { extracted };
                Ok(())
            }
            Err(e) => Err(self.fail_extraction(e)),
        }
    }

    /// Chooses (or changes) the report language. Never starts an analysis.
    pub fn select_language(&mut self, language: ReportLanguage) -> Result<(), SessionError> {
        let request = match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::TextExtracted { extracted } => {
                match AnalysisRequest::new(extracted.text, language) {
                    Some(request) => request,
                    None => return Err(self.fail_extraction(ExtractionFailure::NoText)),
                }
            }
            SessionState::LanguageSelected { request }
            | SessionState::Displayed { request, .. }
            | SessionState::Failed {
                stage: FailedStage::Analysis,
                request: Some(request),
                ..
            } => request.with_language(language),
            other => return Err(self.reject(other, "select a language")),
        };

        debug!(session_id = %self.id, language = %language, "Report language selected");
        self.state = SessionState::LanguageSelected { request };
        Ok(())
    }

    /// Runs the analysis for the selected language and renders the report.
    /// Also used to retry after an analysis failure.
    pub async fn analyze(&mut self, generator: &dyn TextGenerator) -> Result<(), SessionError> {
        let request = match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::LanguageSelected { request }
            | SessionState::Failed {
                stage: FailedStage::Analysis,
                request: Some(request),
                ..
            } => request,
            other => return Err(self.reject(other, "analyze")),
        };

        info!(
            session_id = %self.id,
            language = %request.report_language(),
            model = generator.model(),
            "Analyzing resume"
        );

        let prompt = request.prompt();
        self.state = SessionState::Analyzing;

        match analysis::analyze(generator, &prompt).await {
            Ok(result) => {
                let report = report::build_document(&result);
                info!(session_id = %self.id, blocks = report.blocks.len(), "Report rendered");
                self.state = SessionState::Displayed { request, report };
                Ok(())
            }
            Err(e) => {
                warn!(session_id = %self.id, kind = e.kind(), "Analysis failed: {e}");
                self.state = SessionState::Failed {
                    stage: FailedStage::Analysis,
                    message: e.user_message().to_string(),
                    request: Some(request),
                };
                Err(e.into())
            }
        }
    }

    fn fail_extraction(&mut self, failure: ExtractionFailure) -> SessionError {
        warn!(session_id = %self.id, "PDF extraction failed: {failure}");
        self.state = SessionState::Failed {
            stage: FailedStage::Extraction,
            message: failure.user_message(),
            request: None,
        };
        failure.into()
    }

    /// Puts `state` back and reports the illegal event.
    fn reject(&mut self, state: SessionState, event: &'static str) -> SessionError {
        let err = SessionError::InvalidTransition {
            state: state.name(),
            event,
        };
        self.state = state;
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::testing::{BrokenPages, FixedPages};
    use crate::llm_client::testing::StubGenerator;

    const REPLY: &str = r#"Sure! ```json
{"language": "English", "overall_summary": {"overall_score": 72}}
```"#;

    fn uploaded() -> AnalysisSession {
        let mut session = AnalysisSession::new();
        session.upload(Bytes::from_static(b"%PDF-1.7"));
        session
    }

    #[test]
    fn test_starts_idle() {
        assert_eq!(AnalysisSession::new().state().name(), "idle");
    }

    #[test]
    fn test_extract_success() {
        let mut session = uploaded();
        assert_eq!(session.state().name(), "file_uploaded");
        session.extract(&FixedPages(vec!["Jane ", "Doe"])).unwrap();
        assert_eq!(session.extracted().unwrap().text, "Jane Doe");
        assert_eq!(session.state().name(), "text_extracted");
    }

    #[test]
    fn test_extract_failure_halts_at_failed() {
        let mut session = uploaded();
        let err = session.extract(&BrokenPages).unwrap_err();
        assert!(matches!(err, SessionError::Extraction(_)));
        match session.state() {
            SessionState::Failed { stage, message, request } => {
                assert_eq!(*stage, FailedStage::Extraction);
                assert!(message.starts_with("PDF reading error"));
                assert!(request.is_none());
            }
            other => panic!("unexpected state {}", other.name()),
        }
    }

    #[tokio::test]
    async fn test_extraction_failure_never_reaches_analysis() {
        let stub = StubGenerator::replying(REPLY);
        let mut session = uploaded();
        session.extract(&BrokenPages).unwrap_err();

        assert!(matches!(
            session.select_language(ReportLanguage::English),
            Err(SessionError::InvalidTransition { state: "failed", .. })
        ));
        assert!(session.analyze(&stub).await.is_err());
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn test_reupload_recovers_from_extraction_failure() {
        let mut session = uploaded();
        session.extract(&BrokenPages).unwrap_err();
        session.upload(Bytes::from_static(b"%PDF-1.7"));
        assert!(session.extract(&FixedPages(vec!["CV"])).is_ok());
    }

    #[test]
    fn test_extract_requires_upload() {
        let mut session = AnalysisSession::new();
        let err = session.extract(&FixedPages(vec!["CV"])).unwrap_err();
        assert_eq!(err.to_string(), "cannot extract while session is idle");
        assert_eq!(session.state().name(), "idle");
    }

    #[test]
    fn test_uploaded_bytes_consumed_once() {
        let mut session = uploaded();
        session.extract(&FixedPages(vec!["CV"])).unwrap();
        assert!(matches!(
            session.extract(&FixedPages(vec!["CV"])),
            Err(SessionError::InvalidTransition {
                state: "text_extracted",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_selecting_language_does_not_analyze() {
        let stub = StubGenerator::replying(REPLY);
        let mut session = AnalysisSession::from_text("CV text".to_string()).unwrap();
        session.select_language(ReportLanguage::German).unwrap();
        session.select_language(ReportLanguage::French).unwrap();
        assert_eq!(session.state().name(), "language_selected");
        assert_eq!(stub.calls(), 0);

        session.analyze(&stub).await.unwrap();
        assert!(stub.last_prompt().unwrap().contains("Respond in French."));
    }

    #[tokio::test]
    async fn test_analyze_requires_language() {
        let stub = StubGenerator::replying(REPLY);
        let mut session = AnalysisSession::from_text("CV text".to_string()).unwrap();
        let err = session.analyze(&stub).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                state: "text_extracted",
                event: "analyze"
            }
        ));
        assert_eq!(session.state().name(), "text_extracted");
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_full_flow_displays_report() {
        let stub = StubGenerator::replying(REPLY);
        let mut session = uploaded();
        session.extract(&FixedPages(vec!["Jane Doe, ", "Rust engineer"])).unwrap();
        session.select_language(ReportLanguage::Italian).unwrap();

        session.analyze(&stub).await.unwrap();
        let report = session.report().unwrap();
        assert_eq!(report.subheaders().len(), 7);
        assert!(report.to_markdown().contains("**Overall Score:** 72/100"));
        assert_eq!(session.state().name(), "displayed");
        assert_eq!(stub.calls(), 1);

        let prompt = stub.last_prompt().unwrap();
        assert!(prompt.contains("Jane Doe, Rust engineer"));
        assert!(prompt.contains("Respond in Italian."));
    }

    #[tokio::test]
    async fn test_analysis_failure_allows_retry() {
        let failing = StubGenerator::failing();
        let mut session = AnalysisSession::from_text("CV text".to_string()).unwrap();
        session.select_language(ReportLanguage::Spanish).unwrap();

        let err = session.analyze(&failing).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Analysis(AnalysisFailure::Transport(_))
        ));
        match session.state() {
            SessionState::Failed { stage, message, request } => {
                assert_eq!(*stage, FailedStage::Analysis);
                assert_eq!(message, analysis::ANALYSIS_FAILED_MESSAGE);
                assert_eq!(
                    request.as_ref().unwrap().report_language(),
                    ReportLanguage::Spanish
                );
            }
            other => panic!("unexpected state {}", other.name()),
        }

        let working = StubGenerator::replying(REPLY);
        session.analyze(&working).await.unwrap();
        assert_eq!(session.state().name(), "displayed");
        assert!(working.last_prompt().unwrap().contains("Respond in Spanish."));
    }

    #[tokio::test]
    async fn test_no_json_reply_fails_analysis() {
        let stub = StubGenerator::replying("No JSON here");
        let mut session = AnalysisSession::from_text("CV text".to_string()).unwrap();
        session.select_language(ReportLanguage::English).unwrap();
        let err = session.analyze(&stub).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Analysis(AnalysisFailure::NoJsonFound)
        ));
        assert!(session.report().is_none());
    }

    #[tokio::test]
    async fn test_language_change_after_display() {
        let stub = StubGenerator::replying(REPLY);
        let mut session = AnalysisSession::from_text("CV text".to_string()).unwrap();
        session.select_language(ReportLanguage::English).unwrap();
        session.analyze(&stub).await.unwrap();

        session.select_language(ReportLanguage::Turkish).unwrap();
        assert_eq!(session.state().name(), "language_selected");
        session.analyze(&stub).await.unwrap();
        assert_eq!(stub.calls(), 2);
        assert!(stub.last_prompt().unwrap().contains("Respond in Turkish."));
    }

    #[test]
    fn test_from_text_rejects_blank() {
        assert!(matches!(
            AnalysisSession::from_text("   ".to_string()),
            Err(SessionError::Extraction(ExtractionFailure::NoText))
        ));
    }
}
