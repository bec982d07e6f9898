//! Embedding generation for semantic search
//!
//! The model is a pluggable dependency behind the [`Embedder`] trait; the
//! bundled backend runs all-MiniLM-L6-v2 locally via fastembed.

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use thiserror::Error;
use tracing::info;

use crate::knowledge::FaqRecord;

/// The embedding model could not be loaded. The provider is unusable for
/// the rest of the process lifetime.
#[derive(Debug, Error)]
#[error("failed to load embedding model: {0}")]
pub struct InitError(pub String);

/// A single embedding call failed. The model itself remains usable.
#[derive(Debug, Error)]
#[error("embedding failed: {0}")]
pub struct EmbedError(pub String);

/// Text to fixed-length vector. Any backend (local model, remote API) can
/// stand in; the engine only depends on this seam.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    fn dimension(&self) -> usize;
}

/// Local sentence-embedding backend
pub struct TextEmbedder {
    model: TextEmbedding,
    dimension: usize,
}

impl TextEmbedder {
    /// Load the default model. Downloads model files on first use, so this
    /// can be slow and can fail without network access.
    pub fn load() -> Result<Self, InitError> {
        info!("loading embedding model");

        let mut options = InitOptions::default();
        options.model_name = EmbeddingModel::AllMiniLML6V2;
        options.show_download_progress = true;

        let model = TextEmbedding::try_new(options).map_err(|e| InitError(e.to_string()))?;

        Ok(Self {
            model,
            dimension: 384, // AllMiniLML6V2 dimension
        })
    }
}

impl Embedder for TextEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let embeddings = self
            .model
            .embed(vec![text], None)
            .map_err(|e| EmbedError(e.to_string()))?;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError("no embedding generated".to_string()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Build the text a record is embedded as: question, answer, category,
/// keywords and steps folded into one string so the vector captures all of
/// the record's signal.
pub fn combined_text(record: &FaqRecord) -> String {
    let mut parts = vec![
        format!("Question: {}", record.question),
        format!("Answer: {}", record.answer),
        format!("Category: {}", record.category),
    ];

    if !record.keywords.is_empty() {
        parts.push(format!("Keywords: {}", record.keywords.join(", ")));
    }

    if let Some(steps) = record.steps.as_deref().filter(|s| !s.is_empty()) {
        let steps_text = steps
            .iter()
            .map(|s| format!("Step {}: {}", s.step, s.description))
            .collect::<Vec<_>>()
            .join(" ");
        parts.push(format!("Steps: {}", steps_text));
    }

    parts.join(" ")
}

/// Cosine similarity. Returns 0.0 for zero-norm or mismatched vectors so
/// degenerate embeddings read as non-matches instead of NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f32, 0.0f32, 0.0f32), |(d, na, nb), (x, y)| {
            (d + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::FaqStep;
    use chrono::Utc;

    fn record_with(keywords: Vec<String>, steps: Option<Vec<FaqStep>>) -> FaqRecord {
        FaqRecord {
            id: "faq-1".to_string(),
            question: "How do I cancel an invoice?".to_string(),
            answer: "Press Alt+X.".to_string(),
            category: "Features".to_string(),
            keywords,
            steps,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_cosine_similarity_basics() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        let c = vec![0.0, 1.0, 0.0];

        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &c).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_vector_is_zero() {
        let v = vec![0.3, -0.7, 0.2];
        let zero = vec![0.0, 0.0, 0.0];

        let similarity = cosine_similarity(&v, &zero);
        assert_eq!(similarity, 0.0);
        assert!(!similarity.is_nan());
    }

    #[test]
    fn test_cosine_similarity_length_mismatch_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_combined_text_minimal_record() {
        let record = record_with(vec![], None);
        assert_eq!(
            combined_text(&record),
            "Question: How do I cancel an invoice? Answer: Press Alt+X. Category: Features"
        );
    }

    #[test]
    fn test_combined_text_full_record() {
        let record = record_with(
            vec!["cancel".to_string(), "invoice".to_string()],
            Some(vec![
                FaqStep {
                    step: 1,
                    description: "Open the invoice".to_string(),
                },
                FaqStep {
                    step: 2,
                    description: "Press Alt+X".to_string(),
                },
            ]),
        );

        assert_eq!(
            combined_text(&record),
            "Question: How do I cancel an invoice? Answer: Press Alt+X. \
             Category: Features Keywords: cancel, invoice \
             Steps: Step 1: Open the invoice Step 2: Press Alt+X"
        );
    }

    #[test]
    #[ignore] // Requires model download
    fn test_text_embedder_dimension() {
        let embedder = TextEmbedder::load().unwrap();
        let vector = embedder.embed("enable GST in TallyPrime").unwrap();
        assert_eq!(vector.len(), embedder.dimension());
    }
}
