//! Axum route handlers for the Builder API.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::builder::generator::generate_resume;
use crate::errors::AppError;
use crate::export::{export_pdf, EXPORT_FILE_NAME, PDF_MIME};
use crate::models::resume::{GeneratedResume, ResumeFields};
use crate::request::AppJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub text: String,
}

/// POST /api/v1/builder/generate
///
/// Validates the form fields and returns the generated resume text.
pub async fn handle_generate(
    State(state): State<AppState>,
    AppJson(fields): AppJson<ResumeFields>,
) -> Result<Json<GeneratedResume>, AppError> {
    let resume = generate_resume(state.llm.as_ref(), &fields).await?;
    Ok(Json(GeneratedResume { resume }))
}

/// POST /api/v1/builder/export
///
/// Renders any text blob to a downloadable `resume.pdf`.
pub async fn handle_export(AppJson(request): AppJson<ExportRequest>) -> Result<Response, AppError> {
    let pdf = export_pdf(request.text).await?;

    Ok((
        [
            (header::CONTENT_TYPE, PDF_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
