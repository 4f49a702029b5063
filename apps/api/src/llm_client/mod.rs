//! LLM Client — the single point of entry for all language-model calls.
//!
//! ARCHITECTURAL RULE: No other module may call the chat completions API directly.
//! Feedback and resume generation go through the `TextGenerator` trait, which
//! `LlmClient` implements.
//!
//! Model: gpt-4 (hardcoded — do not make configurable to prevent drift)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// The model used for all LLM calls.
pub const MODEL: &str = "gpt-4";
/// Sampling temperature shared by feedback and resume generation.
pub const TEMPERATURE: f32 = 0.5;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication rejected (status {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Single-turn text generation capability.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>` so handlers never see the
/// HTTP client and tests can swap in a recording fake.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Content of the first choice, if the model returned any text.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// HTTP client for an OpenAI-compatible chat completions endpoint.
/// One attempt per call: failures are returned to the caller untouched.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Makes a raw call to the chat completions API, returning the full response object.
    pub async fn call(&self, prompt: &str, temperature: f32) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!("LLM request: model={MODEL}, prompt_chars={}", prompt.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}", status);
            return Err(classify_failure(status.as_u16(), &body));
        }

        let chat_response: ChatResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat_response)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        let response = self.call(prompt, temperature).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Maps a non-success status and body to the matching `LlmError` variant.
fn classify_failure(status: u16, body: &str) -> LlmError {
    // Prefer the structured error message when the API sends one
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        401 | 403 => LlmError::Auth { status, message },
        429 => LlmError::RateLimited { message },
        _ => LlmError::Api { status, message },
    }
}
