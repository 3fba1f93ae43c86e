//! BM25 Okapi scoring over an in-hand corpus.
//!
//! The corpus is whatever the store enumerated for this request; there is no
//! persistent inverted index, so document frequencies are computed per call.

use std::collections::{HashMap, HashSet};

use crate::rag::tokenizer::tokenize;
use crate::rag::types::{sort_by_score_desc, ScoredDocument};

/// Term frequency saturation
pub const BM25_K1: f64 = 1.5;
/// Length normalization
pub const BM25_B: f64 = 0.75;

/// Keyword scorer
#[derive(Debug, Clone, Copy)]
pub struct Bm25Scorer {
    k1: f64,
    b: f64,
}

impl Default for Bm25Scorer {
    fn default() -> Self {
        Self {
            k1: BM25_K1,
            b: BM25_B,
        }
    }
}

impl Bm25Scorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score `corpus` against `query`.
    ///
    /// Documents sharing no term with the query are dropped, the rest come back
    /// sorted by descending score with ties in corpus order. Text and metadata
    /// are carried over; the incoming score is replaced.
    pub fn score(&self, query: &str, corpus: Vec<ScoredDocument>) -> Vec<ScoredDocument> {
        let query_terms: Vec<String> = tokenize(query).collect();
        if query_terms.is_empty() || corpus.is_empty() {
            return Vec::new();
        }

        let doc_terms: Vec<Vec<String>> = corpus.iter().map(|d| tokenize(&d.text).collect()).collect();

        let n = corpus.len() as f64;
        let total_len: usize = doc_terms.iter().map(Vec::len).sum();
        let avg_doc_len = total_len as f64 / n;
        if avg_doc_len == 0.0 {
            return Vec::new();
        }

        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for terms in &doc_terms {
            let unique: HashSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut scored: Vec<ScoredDocument> = corpus
            .into_iter()
            .zip(&doc_terms)
            .filter_map(|(doc, terms)| {
                let score = self.score_terms(&query_terms, terms, &doc_freq, n, avg_doc_len);
                (score > 0.0).then(|| doc.with_score(score))
            })
            .collect();

        sort_by_score_desc(&mut scored);
        scored
    }

    fn score_terms(
        &self,
        query_terms: &[String],
        doc_terms: &[String],
        doc_freq: &HashMap<&str, usize>,
        n: f64,
        avg_doc_len: f64,
    ) -> f64 {
        let doc_len = doc_terms.len() as f64;
        let mut score = 0.0;

        for term in query_terms {
            let df = match doc_freq.get(term.as_str()) {
                Some(&df) if df > 0 => df as f64,
                _ => continue,
            };
            let tf = doc_terms.iter().filter(|t| *t == term).count() as f64;
            if tf == 0.0 {
                continue;
            }

            // IDF: ln((N - df + 0.5) / (df + 0.5) + 1)
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
            let norm = tf + self.k1 * (1.0 - self.b + self.b * doc_len / avg_doc_len);
            score += idf * tf * (self.k1 + 1.0) / norm;
        }

        score
    }
}
