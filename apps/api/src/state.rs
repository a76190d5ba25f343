use std::sync::Arc;

use crate::config::Config;
use crate::extraction::PageSource;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; every request builds its own session.
#[derive(Clone)]
pub struct AppState {
    /// Model backend chosen from `LLM_PROVIDER` at startup.
    pub generator: Arc<dyn TextGenerator>,
    pub pages: Arc<dyn PageSource>,
    pub config: Config,
}
