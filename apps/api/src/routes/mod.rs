pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/languages", get(handlers::handle_languages))
        .route("/api/v1/resume/extract", post(handlers::handle_extract))
        .route("/api/v1/resume/analyze", post(handlers::handle_analyze))
        .route(
            "/api/v1/resume/analyze-text",
            post(handlers::handle_analyze_text),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
