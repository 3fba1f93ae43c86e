//! Vector store capability.
//!
//! The pipeline only ever issues one kind of call: a ranked similarity search.
//! Keyword retrieval reuses it as a bulk listing (zero vector, `min_score`
//! 0, very large `max_results`), which is why stores advertise whether that
//! enumeration is meaningful for them.

pub mod in_memory;
pub mod qdrant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::StageError;
use crate::rag::types::{Metadata, ScoredDocument};

pub use in_memory::InMemoryStore;
pub use qdrant::QdrantStore;

/// Similarity search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub embedding: Vec<f32>,
    pub max_results: usize,
    pub min_score: f64,
    /// Opaque routing hints, interpreted (or ignored) by the store
    pub store_type: String,
    pub tenant_id: String,
}

/// A single ranked match returned by a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMatch {
    pub text: String,
    pub metadata: Metadata,
    pub score: f64,
}

impl From<StoredMatch> for ScoredDocument {
    fn from(m: StoredMatch) -> Self {
        ScoredDocument::new(m.text, m.metadata, m.score)
    }
}

/// Ranked nearest-neighbour search. Must be safe for concurrent use.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Matches ordered by descending similarity
    async fn search(&self, request: &SearchRequest) -> Result<Vec<StoredMatch>, StageError>;

    /// Whether a zero-vector wide search returns the whole corpus
    fn supports_enumeration(&self) -> bool {
        false
    }
}

/// Cosine similarity; 0.0 when either vector has zero norm or lengths differ
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let v = vec![0.3, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_orthogonal() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_cosine_length_mismatch() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_stored_match_into_document() {
        let m = StoredMatch {
            text: "text".to_string(),
            metadata: Metadata::new(),
            score: 0.8,
        };
        let doc: ScoredDocument = m.into();
        assert_eq!(doc.text, "text");
        assert_eq!(doc.score, 0.8);
    }
}
