use std::sync::Arc;

use crate::analysis::similarity::Embedder;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Remote text generation. Default: `LlmClient` against the chat completions API.
    pub llm: Arc<dyn TextGenerator>,
    /// Sentence embedding model, loaded once at startup and only read afterwards.
    pub embedder: Arc<dyn Embedder>,
}
