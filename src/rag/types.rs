// Core data model shared by every pipeline stage
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{PipelineError, Result};

/// Metadata attached to a stored segment
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Upper bound for `top_k`
pub const MAX_TOP_K: usize = 1000;

/// A retrieved text segment with its current score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub score: f64,
}

impl ScoredDocument {
    pub fn new(text: impl Into<String>, metadata: Metadata, score: f64) -> Self {
        Self {
            text: text.into(),
            metadata,
            score,
        }
    }

    /// Same text and metadata, new score
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}

/// Stable descending sort by score; equal scores keep their input order
pub(crate) fn sort_by_score_desc(documents: &mut [ScoredDocument]) {
    documents.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// How the initial candidate list is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalStrategy {
    /// Vector similarity only
    Dense,
    /// BM25 over the enumerated corpus
    Keyword,
    /// Dense and keyword fused with RRF
    #[default]
    Hybrid,
}

impl RetrievalStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dense => "dense",
            Self::Keyword => "keyword",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrievalStrategy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "dense" => Ok(Self::Dense),
            "keyword" => Ok(Self::Keyword),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(PipelineError::invalid(
                "strategy",
                format!("must be one of dense|keyword|hybrid, got '{}'", other),
            )),
        }
    }
}

/// Per-request retrieval configuration, read-only once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub query: String,
    /// Candidates kept after retrieval and dedup
    pub top_k: usize,
    /// Documents returned to the caller
    pub final_k: usize,
    /// Similarity floor passed to the vector store (0.0 to 1.0)
    pub min_score: f64,
    pub strategy: RetrievalStrategy,
    pub enable_reranking: bool,
    pub enable_diversity: bool,
    pub enable_query_expansion: bool,
    /// Exact-match metadata predicate
    #[serde(default)]
    pub filters: Metadata,
    /// Routing hints handed to the store untouched
    #[serde(default)]
    pub store_type: String,
    #[serde(default)]
    pub tenant_id: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            query: String::new(),
            top_k: 10,
            final_k: 5,
            min_score: 0.3,
            strategy: RetrievalStrategy::default(),
            enable_reranking: true,
            enable_diversity: true,
            enable_query_expansion: false,
            filters: Metadata::new(),
            store_type: "memory".to_string(),
            tenant_id: String::new(),
        }
    }
}

impl RetrievalConfig {
    /// Default configuration for a query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Check sizing and threshold invariants
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(PipelineError::invalid("query", "must not be blank"));
        }

        if self.top_k == 0 || self.top_k > MAX_TOP_K {
            return Err(PipelineError::invalid(
                "top_k",
                format!("must be in (0, {}], got {}", MAX_TOP_K, self.top_k),
            ));
        }

        if self.final_k == 0 || self.final_k > self.top_k {
            return Err(PipelineError::invalid(
                "final_k",
                format!("must be in (0, top_k={}], got {}", self.top_k, self.final_k),
            ));
        }

        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(PipelineError::invalid(
                "min_score",
                format!("must be in [0, 1], got {}", self.min_score),
            ));
        }

        Ok(())
    }
}

/// Pipeline output handed to the generation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Unique candidates after dedup and the `top_k` cut
    pub results_retrieved: usize,
    pub final_results: usize,
    pub avg_score: f64,
    pub max_score: f64,
    pub min_score: f64,
    /// Index-parallel with `metadata`
    pub contexts: Vec<String>,
    pub metadata: Vec<Metadata>,
    pub reranked: bool,
}

impl RetrievalResult {
    /// Project the final documents into parallel sequences plus score stats
    pub fn from_documents(
        results_retrieved: usize,
        documents: Vec<ScoredDocument>,
        reranked: bool,
    ) -> Self {
        let final_results = documents.len();
        let (avg_score, max_score, min_score) = if documents.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let sum: f64 = documents.iter().map(|d| d.score).sum();
            let max = documents.iter().map(|d| d.score).fold(f64::MIN, f64::max);
            let min = documents.iter().map(|d| d.score).fold(f64::MAX, f64::min);
            (sum / final_results as f64, max, min)
        };

        let (contexts, metadata) = documents
            .into_iter()
            .map(|d| (d.text, d.metadata))
            .unzip();

        Self {
            results_retrieved,
            final_results,
            avg_score,
            max_score,
            min_score,
            contexts,
            metadata,
            reranked,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.final_results == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(text: &str, score: f64) -> ScoredDocument {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), json!(text));
        ScoredDocument::new(text, metadata, score)
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("dense".parse::<RetrievalStrategy>().unwrap(), RetrievalStrategy::Dense);
        assert_eq!(" Keyword ".parse::<RetrievalStrategy>().unwrap(), RetrievalStrategy::Keyword);
        assert_eq!("HYBRID".parse::<RetrievalStrategy>().unwrap(), RetrievalStrategy::Hybrid);
        assert!("sparse".parse::<RetrievalStrategy>().is_err());
        assert_eq!(RetrievalStrategy::Keyword.to_string(), "keyword");
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = RetrievalConfig::new("what is rust");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_blank_query() {
        let config = RetrievalConfig::new("   ");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig { field: "query", .. }));
    }

    #[test]
    fn test_validation_rejects_top_k_bounds() {
        let mut config = RetrievalConfig::new("query");
        config.top_k = 0;
        assert!(config.validate().is_err());

        config.top_k = MAX_TOP_K + 1;
        config.final_k = 1;
        assert!(config.validate().is_err());

        config.top_k = MAX_TOP_K;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_final_k_above_top_k() {
        let config = RetrievalConfig {
            top_k: 5,
            final_k: 10,
            ..RetrievalConfig::new("query")
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig { field: "final_k", .. }));
    }

    #[test]
    fn test_validation_rejects_min_score_out_of_range() {
        let mut config = RetrievalConfig::new("query");
        config.min_score = 1.5;
        assert!(config.validate().is_err());
        config.min_score = -0.1;
        assert!(config.validate().is_err());
        config.min_score = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_result_projection_keeps_pairs_aligned() {
        let docs = vec![doc("alpha", 0.9), doc("beta", 0.5), doc("gamma", 0.1)];
        let result = RetrievalResult::from_documents(7, docs, true);

        assert_eq!(result.results_retrieved, 7);
        assert_eq!(result.final_results, 3);
        assert_eq!(result.contexts.len(), result.metadata.len());
        for (text, meta) in result.contexts.iter().zip(&result.metadata) {
            assert_eq!(meta["source"], json!(text));
        }
        assert!((result.avg_score - 0.5).abs() < 1e-12);
        assert_eq!(result.max_score, 0.9);
        assert_eq!(result.min_score, 0.1);
        assert!(result.reranked);
    }

    #[test]
    fn test_empty_result_stats_are_zero() {
        let result = RetrievalResult::from_documents(0, Vec::new(), false);
        assert!(result.is_empty());
        assert_eq!(result.avg_score, 0.0);
        assert_eq!(result.max_score, 0.0);
        assert_eq!(result.min_score, 0.0);
        assert!(result.contexts.is_empty());
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let mut docs = vec![doc("a", 0.5), doc("b", 0.7), doc("c", 0.5)];
        sort_by_score_desc(&mut docs);
        let order: Vec<&str> = docs.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }
}
