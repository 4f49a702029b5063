//! Axum route handlers for the Analysis API.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analysis::extractor::{extract_resume_text, normalize_whitespace};
use crate::analysis::feedback::generate_feedback;
use crate::analysis::non_blank;
use crate::analysis::similarity::{score_match, SimilarityScore};
use crate::errors::{AppError, Step};
use crate::request::AppJson;
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";
const JOB_DESCRIPTION_FIELD: &str = "job_description";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Parsed multipart body of an analyze/extract upload.
#[derive(Debug)]
pub struct AnalyzeUpload {
    pub resume: Bytes,
    pub job_description: Option<String>,
}

#[async_trait]
impl<S> FromRequest<S> for AnalyzeUpload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await?;
        read_upload(multipart).await
    }
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub resume_text: String,
}

/// A pipeline step that failed after earlier steps had already produced output.
#[derive(Debug, Serialize)]
pub struct StepFailure {
    pub step: Option<Step>,
    pub code: &'static str,
    pub message: String,
}

impl From<&AppError> for StepFailure {
    fn from(error: &AppError) -> Self {
        let (_, code, message) = error.classify();
        Self {
            step: error.step(),
            code,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub resume_text: String,
    pub feedback: Option<String>,
    pub similarity: Option<SimilarityScore>,
    pub failures: Vec<StepFailure>,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub resume_text: String,
    #[serde(default)]
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SimilarityResponse {
    pub similarity: SimilarityScore,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze/extract
///
/// Returns the normalized text of the uploaded PDF.
pub async fn handle_extract(upload: AnalyzeUpload) -> Result<Json<ExtractResponse>, AppError> {
    let resume_text = extract_resume_text(upload.resume).await?;
    Ok(Json(ExtractResponse { resume_text }))
}

/// POST /api/v1/analyze
///
/// Full analysis: extract → feedback → similarity.
/// Extraction failure fails the request. Later failures are reported in
/// `failures` next to whatever was already computed.
pub async fn handle_analyze(
    State(state): State<AppState>,
    upload: AnalyzeUpload,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let resume_text = extract_resume_text(upload.resume).await?;
    let job_description = upload.job_description.as_deref();

    let mut failures = Vec::new();

    let feedback =
        match generate_feedback(state.llm.as_ref(), &resume_text, job_description).await {
            Ok(feedback) => Some(feedback),
            Err(e) => {
                warn!("Feedback step failed: {e}");
                failures.push(StepFailure::from(&e));
                None
            }
        };

    let similarity = match score_match(state.embedder.clone(), &resume_text, job_description).await
    {
        Ok(score) => Some(score),
        Err(e) => {
            warn!("Similarity step failed: {e}");
            failures.push(StepFailure::from(&e));
            None
        }
    };

    Ok(Json(AnalyzeResponse {
        resume_text,
        feedback,
        similarity,
        failures,
    }))
}

/// POST /api/v1/analyze/similarity
pub async fn handle_similarity(
    State(state): State<AppState>,
    AppJson(request): AppJson<MatchRequest>,
) -> Result<Json<SimilarityResponse>, AppError> {
    let resume_text = require_resume_text(&request.resume_text)?;
    let job_description = non_blank(request.job_description);

    let similarity =
        score_match(state.embedder.clone(), &resume_text, job_description.as_deref()).await?;

    Ok(Json(SimilarityResponse { similarity }))
}

/// POST /api/v1/analyze/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    AppJson(request): AppJson<MatchRequest>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let resume_text = require_resume_text(&request.resume_text)?;
    let job_description = non_blank(request.job_description);

    let feedback =
        generate_feedback(state.llm.as_ref(), &resume_text, job_description.as_deref()).await?;

    Ok(Json(FeedbackResponse { feedback }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn require_resume_text(raw: &str) -> Result<String, AppError> {
    let text = normalize_whitespace(raw);
    if text.is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }
    Ok(text)
}

fn is_pdf_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    matches!(
        essence.as_str(),
        "application/pdf" | "application/x-pdf" | "application/octet-stream"
    )
}

/// Reads the `resume` file and optional `job_description` text from a multipart body.
/// Unknown fields are ignored.
async fn read_upload(mut multipart: Multipart) -> Result<AnalyzeUpload, AppError> {
    let mut resume: Option<Bytes> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(RESUME_FIELD) => {
                if let Some(content_type) = field.content_type() {
                    if !is_pdf_content_type(content_type) {
                        return Err(AppError::Validation(format!(
                            "The '{RESUME_FIELD}' upload must be a PDF, got '{content_type}'"
                        )));
                    }
                }
                resume = Some(field.bytes().await?);
            }
            Some(JOB_DESCRIPTION_FIELD) => {
                job_description = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let resume = resume.ok_or_else(|| {
        AppError::Validation(format!(
            "A PDF file must be uploaded in the '{RESUME_FIELD}' field"
        ))
    })?;

    Ok(AnalyzeUpload {
        resume,
        job_description: non_blank(job_description),
    })
}
