// Resume Analysis: PDF text extraction, job-match similarity, LLM feedback.
// All LLM calls go through llm_client::TextGenerator — no direct API calls here.

pub mod extractor;
pub mod feedback;
pub mod handlers;
pub mod prompts;
pub mod similarity;

/// Treats an absent, empty, or whitespace-only job description as "not supplied".
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
