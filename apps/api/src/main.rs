mod analysis;
mod builder;
mod config;
mod errors;
mod export;
mod llm_client;
mod models;
mod request;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::similarity::{Embedder, SentenceEmbedder, UnavailableEmbedder};
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!(
        "LLM client initialized (model: {}, timeout: {}s)",
        llm_client::MODEL,
        config.llm_timeout_secs
    );

    // Load the embedding model once; scoring degrades to 503 if it is missing
    let cache_dir = config.embedding_cache_dir.clone();
    let embedder: Arc<dyn Embedder> =
        match tokio::task::spawn_blocking(move || SentenceEmbedder::load(cache_dir)).await? {
            Ok(model) => Arc::new(model),
            Err(e) => {
                error!("{e}; similarity scoring is disabled");
                Arc::new(UnavailableEmbedder::new(e.0))
            }
        };

    let state = AppState {
        llm: Arc::new(llm),
        embedder,
    };

    let app = build_router(state, config.max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
