//! Maximal Marginal Relevance selection.
//!
//! Greedy: each round picks the candidate maximising
//! `λ·relevance − (1−λ)·max_sim(candidate, selected)`. The result is not the
//! globally optimal subset; an exact search is combinatorial in `k` and the
//! greedy pass is O(k·n) similarity lookups.

use std::collections::HashSet;

use crate::rag::types::ScoredDocument;

/// Relevance/redundancy trade-off
pub const DEFAULT_LAMBDA: f64 = 0.5;

/// Lowercased whitespace-separated words, no length filter
fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Word-overlap cosine: |A ∩ B| / sqrt(|A|·|B|); 0.0 if either is empty
pub fn word_overlap_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    intersection / ((a.len() * b.len()) as f64).sqrt()
}

/// Diversity selector
#[derive(Debug, Clone, Copy)]
pub struct DiversitySelector {
    lambda: f64,
}

impl Default for DiversitySelector {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
        }
    }
}

impl DiversitySelector {
    pub fn new(lambda: f64) -> Self {
        Self { lambda }
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Select at most `k` documents from `candidates` (sorted by relevance).
    ///
    /// The top candidate is always taken first. Ties on MMR go to the
    /// candidate that appears earliest in the remaining list.
    pub fn select(&self, candidates: Vec<ScoredDocument>, k: usize) -> Vec<ScoredDocument> {
        if k == 0 || candidates.is_empty() {
            return Vec::new();
        }

        let mut remaining: Vec<(ScoredDocument, HashSet<String>)> = candidates
            .into_iter()
            .map(|doc| {
                let words = word_set(&doc.text);
                (doc, words)
            })
            .collect();
        let mut selected: Vec<(ScoredDocument, HashSet<String>)> = Vec::with_capacity(k);
        selected.push(remaining.remove(0));

        while selected.len() < k && !remaining.is_empty() {
            let mut best_idx = 0;
            let mut best_mmr = f64::NEG_INFINITY;

            for (idx, (doc, words)) in remaining.iter().enumerate() {
                let redundancy = selected
                    .iter()
                    .map(|(_, chosen)| word_overlap_similarity(words, chosen))
                    .fold(0.0, f64::max);
                let mmr = self.lambda * doc.score - (1.0 - self.lambda) * redundancy;

                if mmr > best_mmr {
                    best_mmr = mmr;
                    best_idx = idx;
                }
            }

            selected.push(remaining.remove(best_idx));
        }

        selected.into_iter().map(|(doc, _)| doc).collect()
    }
}
