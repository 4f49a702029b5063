//! Similarity Scorer — sentence embeddings + cosine similarity.
//!
//! The embedding model (all-MiniLM-L6-v2 via fastembed) is loaded once in `main`
//! and shared read-only behind `Arc<dyn Embedder>`. If loading fails the server
//! still starts with an `UnavailableEmbedder`, and every score request reports
//! `ModelUnavailable` while feedback and export keep working.

use std::path::PathBuf;
use std::sync::Arc;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info};

use crate::errors::AppError;

/// Label reported when there is no job description to compare against.
pub const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Error)]
#[error("Embedding model unavailable: {0}")]
pub struct ModelUnavailable(pub String);

/// Match score between a resume and a job description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimilarityScore {
    /// Cosine similarity clamped to [0, 1] and rounded to two decimals.
    Score(f64),
    NotApplicable,
}

impl Serialize for SimilarityScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SimilarityScore::Score(value) => serializer.serialize_f64(*value),
            SimilarityScore::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Embedder trait + backends
// ────────────────────────────────────────────────────────────────────────────

/// Turns texts into fixed-length vectors. Implementations are blocking and
/// must be called from `spawn_blocking`.
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ModelUnavailable>;
}

/// Local ONNX sentence-embedding model.
pub struct SentenceEmbedder {
    model: TextEmbedding,
}

impl SentenceEmbedder {
    /// Loads all-MiniLM-L6-v2, downloading the weights into `cache_dir` on first use.
    pub fn load(cache_dir: Option<PathBuf>) -> Result<Self, ModelUnavailable> {
        let mut options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        let model = TextEmbedding::try_new(options)
            .map_err(|e| ModelUnavailable(format!("failed to load all-MiniLM-L6-v2: {e}")))?;
        info!("Sentence embedding model loaded (all-MiniLM-L6-v2)");
        Ok(Self { model })
    }
}

impl Embedder for SentenceEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ModelUnavailable> {
        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| ModelUnavailable(format!("embedding inference failed: {e}")))
    }
}

/// Stand-in used when the model failed to load at startup.
pub struct UnavailableEmbedder {
    reason: String,
}

impl UnavailableEmbedder {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Embedder for UnavailableEmbedder {
    fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, ModelUnavailable> {
        Err(ModelUnavailable(self.reason.clone()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Clamps a cosine value into [0, 1] and rounds it to two decimals.
pub fn to_unit_score(cosine: f64) -> f64 {
    if !cosine.is_finite() {
        return 0.0;
    }
    (cosine.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

/// Embeds both texts and returns their rounded similarity. Blocking.
pub fn similarity(embedder: &dyn Embedder, a: &str, b: &str) -> Result<f64, ModelUnavailable> {
    let vectors = embedder.embed(&[a, b])?;
    match vectors.as_slice() {
        [first, second] => {
            let cosine = cosine_similarity(first, second);
            debug!("Raw cosine similarity {cosine:.4}");
            Ok(to_unit_score(cosine))
        }
        other => Err(ModelUnavailable(format!(
            "expected 2 embeddings, model returned {}",
            other.len()
        ))),
    }
}

/// Scores a resume against an optional job description on the blocking pool.
///
/// A missing or blank job description short-circuits to `NotApplicable`
/// without touching the model.
pub async fn score_match(
    embedder: Arc<dyn Embedder>,
    resume_text: &str,
    job_description: Option<&str>,
) -> Result<SimilarityScore, AppError> {
    let Some(job_description) = job_description.filter(|jd| !jd.trim().is_empty()) else {
        return Ok(SimilarityScore::NotApplicable);
    };

    let resume_text = resume_text.to_string();
    let job_description = job_description.to_string();
    let score = tokio::task::spawn_blocking(move || {
        similarity(embedder.as_ref(), &resume_text, &job_description)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("similarity task panicked: {e}")))??;

    info!("Similarity score: {score:.2}");
    Ok(SimilarityScore::Score(score))
}
