//! Resume Generator — validated form fields → generated resume text.
//!
//! Validation runs before anything else: a request missing name, title,
//! summary, or skills never reaches the language model.

use tracing::info;

use crate::builder::prompts::RESUME_PROMPT_TEMPLATE;
use crate::errors::{AppError, Step};
use crate::llm_client::{TextGenerator, TEMPERATURE};
use crate::models::resume::ResumeFields;

/// Rejects field sets missing any required value.
pub fn validate_fields(fields: &ResumeFields) -> Result<(), AppError> {
    let missing = fields.missing_required();
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::Validation(format!(
        "Please fill at least Name, Title, Summary, and Skills (missing: {})",
        missing.join(", ")
    )))
}

pub fn build_resume_prompt(fields: &ResumeFields) -> String {
    RESUME_PROMPT_TEMPLATE
        .replace("{name}", fields.name.trim())
        .replace("{title}", fields.title.trim())
        .replace("{summary}", fields.summary.trim())
        .replace("{skills}", fields.skills.trim())
        .replace("{experience}", fields.experience.trim())
        .replace("{education}", fields.education.trim())
}

/// Validates the fields, then asks the language model for a formatted resume.
pub async fn generate_resume(
    llm: &dyn TextGenerator,
    fields: &ResumeFields,
) -> Result<String, AppError> {
    validate_fields(fields)?;

    let prompt = build_resume_prompt(fields);
    info!("Generating resume for title '{}'", fields.title.trim());

    llm.generate(&prompt, TEMPERATURE)
        .await
        .map_err(AppError::remote(Step::Generate))
}
