use serde::{Deserialize, Serialize};

/// Form fields the resume builder turns into a generated resume.
///
/// `name`, `title`, `summary`, and `skills` are required; `experience` and
/// `education` may be empty or omitted. Omitted required keys deserialize as
/// empty so they are reported by `missing_required` like blank ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeFields {
    pub name: String,
    pub title: String,
    pub summary: String,
    pub skills: String,
    pub experience: String,
    pub education: String,
}

impl ResumeFields {
    /// Names of required fields that are empty after trimming, in form order.
    pub fn missing_required(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("title", &self.title),
            ("summary", &self.summary),
            ("skills", &self.skills),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// Resume text produced by the language model from `ResumeFields`.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedResume {
    pub resume: String,
}
