// Semantic re-ranking: blend retrieval score with lexical overlap
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::rag::tokenizer::token_set;
use crate::rag::types::{sort_by_score_desc, ScoredDocument};

/// Re-ranking configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReRankConfig {
    /// Weight of the score the document arrived with
    pub retrieval_weight: f64,
    /// Weight of the query/document Jaccard overlap
    pub lexical_weight: f64,
}

impl Default for ReRankConfig {
    fn default() -> Self {
        Self {
            retrieval_weight: 0.7,
            lexical_weight: 0.3,
        }
    }
}

/// Jaccard similarity of two token sets.
///
/// 1.0 when both are empty, 0.0 when exactly one is.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let intersection = a.intersection(b).count();
            let union = a.len() + b.len() - intersection;
            intersection as f64 / union as f64
        }
    }
}

/// Re-ranker for retrieved candidates
#[derive(Debug, Clone, Default)]
pub struct ReRanker {
    config: ReRankConfig,
}

impl ReRanker {
    /// Create new re-ranker with default weights (0.7 / 0.3)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: ReRankConfig) -> Self {
        Self { config }
    }

    /// Rescore every document against `query` and re-sort (stable) by the new score
    pub fn rerank(&self, documents: Vec<ScoredDocument>, query: &str) -> Vec<ScoredDocument> {
        let query_tokens = token_set(query);

        let mut ranked: Vec<ScoredDocument> = documents
            .into_iter()
            .map(|doc| {
                let score = self.compute_score(&doc, &query_tokens);
                doc.with_score(score)
            })
            .collect();

        sort_by_score_desc(&mut ranked);
        ranked
    }

    /// Blended score for a single document
    fn compute_score(&self, doc: &ScoredDocument, query_tokens: &HashSet<String>) -> f64 {
        let overlap = jaccard(query_tokens, &token_set(&doc.text));
        self.config.retrieval_weight * doc.score + self.config.lexical_weight * overlap
    }

    /// Get current configuration
    pub fn config(&self) -> &ReRankConfig {
        &self.config
    }
}
