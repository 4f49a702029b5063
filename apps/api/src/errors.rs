use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::analysis::extractor::ExtractionError;
use crate::analysis::similarity::ModelUnavailable;
use crate::export::ExportError;
use crate::llm_client::LlmError;

/// The pipeline step an error is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Validate,
    Extract,
    Similarity,
    Feedback,
    Generate,
    Export,
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("{0}")]
    ModelUnavailable(#[from] ModelUnavailable),

    #[error("Remote service error during {step:?}: {source}")]
    RemoteService {
        step: Step,
        #[source]
        source: LlmError,
    },

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn remote(step: Step) -> impl FnOnce(LlmError) -> AppError {
        move |source| AppError::RemoteService { step, source }
    }

    /// The step that failed, if the error belongs to one.
    pub fn step(&self) -> Option<Step> {
        match self {
            AppError::Validation(_) | AppError::PayloadTooLarge(_) => Some(Step::Validate),
            AppError::Extraction(_) => Some(Step::Extract),
            AppError::ModelUnavailable(_) => Some(Step::Similarity),
            AppError::RemoteService { step, .. } => Some(*step),
            AppError::Export(_) => Some(Step::Export),
            AppError::Internal(_) => None,
        }
    }

    /// Status, machine-readable code, and user-facing message for this error.
    pub fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Extraction(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                e.to_string(),
            ),
            AppError::ModelUnavailable(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "MODEL_UNAVAILABLE",
                e.to_string(),
            ),
            AppError::RemoteService { source, .. } => match source {
                LlmError::RateLimited { .. } => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "REMOTE_RATE_LIMITED",
                    "The language model service is rate limiting requests".to_string(),
                ),
                LlmError::Auth { .. } => (
                    StatusCode::BAD_GATEWAY,
                    "REMOTE_AUTH_ERROR",
                    "The language model service rejected the configured credentials".to_string(),
                ),
                _ => (
                    StatusCode::BAD_GATEWAY,
                    "REMOTE_SERVICE_ERROR",
                    format!("The language model service failed: {source}"),
                ),
            },
            AppError::Export(e) => (StatusCode::UNPROCESSABLE_ENTITY, "EXPORT_ERROR", e.to_string()),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
            ),
        }
    }
}

/// Body-limit failures keep their 413; every other rejection is a bad request shape.
fn rejection_error(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::Validation(message)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        rejection_error(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        rejection_error(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(error: MultipartError) -> Self {
        rejection_error(error.status(), error.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::RemoteService { step, source } => {
                tracing::error!("Remote service error during {step:?}: {source}");
            }
            AppError::ModelUnavailable(e) => tracing::error!("{e}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            other => tracing::warn!("Request failed: {other}"),
        }

        let (status, code, message) = self.classify();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "step": self.step(),
            }
        }));

        (status, body).into_response()
    }
}
