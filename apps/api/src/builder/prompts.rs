// Prompt constants for the Builder module.

/// Resume generation prompt template.
/// Replace: {name}, {title}, {summary}, {skills}, {experience}, {education}
pub const RESUME_PROMPT_TEMPLATE: &str = r#"Create a professional resume with the following:
- Name: {name}
- Title: {title}
- Summary: {summary}
- Skills: {skills}
- Experience: {experience}
- Education: {education}

Format it in clear sections with bullet points and professional language.
"#;
