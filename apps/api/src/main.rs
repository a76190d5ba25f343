mod analysis;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod report;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::PdfExtractPages;
use crate::llm_client::build_generator;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resumex v{}", env!("CARGO_PKG_VERSION"));

    if config.llm_api_key.is_none() {
        warn!(
            "{} is not set; every analysis request will fail until it is configured",
            config.llm_provider.api_key_var()
        );
    }

    let generator = build_generator(&config)?;
    info!(
        "LLM backend initialized (provider: {:?}, model: {})",
        config.llm_provider,
        generator.model()
    );

    let state = AppState {
        generator,
        pages: Arc::new(PdfExtractPages),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
