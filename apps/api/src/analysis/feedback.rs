//! Feedback Generator — career-coach style critique of a resume.
//!
//! The model's reply is returned as-is; nothing here parses or validates it.

use tracing::info;

use crate::analysis::prompts::FEEDBACK_PROMPT_TEMPLATE;
use crate::errors::{AppError, Step};
use crate::llm_client::{TextGenerator, TEMPERATURE};

/// Fills the feedback template. A missing job description becomes an empty block.
pub fn build_feedback_prompt(resume_text: &str, job_description: Option<&str>) -> String {
    FEEDBACK_PROMPT_TEMPLATE
        .replace("{job_description}", job_description.unwrap_or_default())
        .replace("{resume_text}", resume_text)
}

/// Asks the language model for qualitative feedback on the resume.
pub async fn generate_feedback(
    llm: &dyn TextGenerator,
    resume_text: &str,
    job_description: Option<&str>,
) -> Result<String, AppError> {
    let prompt = build_feedback_prompt(resume_text, job_description);
    info!(
        "Requesting resume feedback (job description: {})",
        if job_description.is_some() { "yes" } else { "no" }
    );

    llm.generate(&prompt, TEMPERATURE)
        .await
        .map_err(AppError::remote(Step::Feedback))
}
