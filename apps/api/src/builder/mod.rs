// Resume Builder: form fields → LLM-generated resume → PDF export.
// All LLM calls go through llm_client::TextGenerator — no direct API calls here.

pub mod generator;
pub mod handlers;
pub mod prompts;
