use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::AnalysisFailure;
use crate::extraction::ExtractionFailure;
use crate::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionFailure),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisFailure),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Extraction(e) => AppError::Extraction(e),
            SessionError::Analysis(e) => AppError::Analysis(e),
            e @ SessionError::InvalidTransition { .. } => AppError::Internal(e.into()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::Validation(format!("Malformed upload: {}", err.body_text()))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "The uploaded file is too large".to_string(),
            ),
            AppError::Extraction(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_FAILED",
                e.user_message(),
            ),
            AppError::Analysis(e) => {
                tracing::error!(kind = e.kind(), "Analysis error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "ANALYSIS_FAILED",
                    e.user_message().to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ANALYSIS_FAILED_MESSAGE;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation("bad".to_string()), StatusCode::BAD_REQUEST),
            (AppError::PayloadTooLarge, StatusCode::PAYLOAD_TOO_LARGE),
            (
                AppError::Extraction(ExtractionFailure::NoText),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Analysis(AnalysisFailure::NoJsonFound),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_analysis_error_body_is_generic() {
        let response = AppError::Analysis(AnalysisFailure::NoJsonFound).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["code"], "ANALYSIS_FAILED");
        assert_eq!(value["error"]["message"], ANALYSIS_FAILED_MESSAGE);
    }

    #[test]
    fn test_invalid_transition_is_internal() {
        let err: AppError = SessionError::InvalidTransition {
            state: "idle",
            event: "analyze",
        }
        .into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
