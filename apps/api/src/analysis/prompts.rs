// Prompt constants for the Analysis module.

/// Feedback prompt template. Replace `{resume_text}` and `{job_description}` before sending.
/// An absent job description is sent as an empty block.
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"You are a career coach. Analyze this resume and provide:
1. Resume Score (Good, Average, Poor)
2. Strengths
3. Weaknesses
4. Suggestions
5. Improved summary or bullet points

Resume:
"""{resume_text}"""

Job Description (if any):
"""{job_description}"""
"#;
