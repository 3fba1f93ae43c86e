// End-to-end retrieval pipeline
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{PipelineError, Result};
use crate::memory::{EmbeddingProvider, VectorStore};
use crate::rag::diversity::DiversitySelector;
use crate::rag::expansion::QueryExpander;
use crate::rag::filter::{deduplicate, MetadataFilter};
use crate::rag::reranking::ReRanker;
use crate::rag::retrieval::RetrievalEngine;
use crate::rag::types::{RetrievalConfig, RetrievalResult, ScoredDocument};

/// Variations requested from the expander (original included)
pub const DEFAULT_EXPANSION_COUNT: usize = 2;

/// Process-level pipeline options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Upper bound for each embedding/store call; `None` waits indefinitely
    pub stage_timeout: Option<Duration>,
    /// Variation count handed to the query expander
    pub expansion_count: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            stage_timeout: None,
            expansion_count: DEFAULT_EXPANSION_COUNT,
        }
    }
}

/// Retrieval pipeline: expand -> retrieve -> dedup -> filter -> rerank -> diversify
pub struct RetrievalPipeline {
    engine: RetrievalEngine,
    expander: QueryExpander,
    reranker: ReRanker,
    diversity: DiversitySelector,
    options: PipelineOptions,
}

impl RetrievalPipeline {
    /// Create pipeline with default options
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self::with_options(embedder, store, PipelineOptions::default())
    }

    /// Create with custom options
    pub fn with_options(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            engine: RetrievalEngine::new(embedder, store).with_timeout(options.stage_timeout),
            expander: QueryExpander::new(),
            reranker: ReRanker::new(),
            diversity: DiversitySelector::default(),
            options,
        }
    }

    /// Replace the re-ranker
    pub fn with_reranker(mut self, reranker: ReRanker) -> Self {
        self.reranker = reranker;
        self
    }

    /// Replace the diversity selector
    pub fn with_diversity(mut self, diversity: DiversitySelector) -> Self {
        self.diversity = diversity;
        self
    }

    /// Get current options
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Queries to retrieve for: the original first, then its expansions
    pub fn query_set(&self, config: &RetrievalConfig) -> Vec<String> {
        let mut queries = vec![config.query.clone()];
        if config.enable_query_expansion {
            queries.extend(
                self.expander
                    .expand(&config.query, self.options.expansion_count),
            );
        }
        queries
    }

    /// Run the pipeline for one request.
    ///
    /// Fails only on an invalid config (before any I/O) or a broken internal
    /// invariant; retrieval failures shrink the result instead.
    pub async fn execute(&self, config: &RetrievalConfig) -> Result<RetrievalResult> {
        config.validate()?;

        // Step 1: Expand
        let queries = self.query_set(config);
        debug!(queries = queries.len(), "query set built");

        // Step 2: Retrieve every query concurrently; join_all keeps query order
        let batches = join_all(queries.iter().map(|q| self.engine.retrieve(q, config))).await;
        let candidates: Vec<ScoredDocument> = batches.into_iter().flatten().collect();
        debug!(candidates = candidates.len(), "candidates gathered");

        // Step 3: Dedup and cut to top_k
        let mut documents = deduplicate(candidates);
        documents.truncate(config.top_k);
        let results_retrieved = documents.len();

        // Step 4: Metadata filter
        let documents = MetadataFilter::new(config.filters.clone()).apply(documents);
        debug!(kept = documents.len(), "metadata filter applied");

        // Step 5: Rerank when there is something to choose between
        let reranked = config.enable_reranking && documents.len() > config.final_k;
        let documents = if reranked {
            self.reranker.rerank(documents, &config.query)
        } else {
            documents
        };

        // Step 6: Diversify
        let mut documents = if config.enable_diversity && documents.len() > config.final_k {
            self.diversity.select(documents, config.final_k)
        } else {
            documents
        };
        documents.truncate(config.final_k);

        let result = RetrievalResult::from_documents(results_retrieved, documents, reranked);
        check_invariants(&result)?;

        info!(
            strategy = %config.strategy,
            retrieved = result.results_retrieved,
            returned = result.final_results,
            reranked = result.reranked,
            "retrieval complete"
        );
        Ok(result)
    }
}

fn check_invariants(result: &RetrievalResult) -> Result<()> {
    if result.contexts.len() != result.final_results || result.metadata.len() != result.final_results {
        return Err(PipelineError::Internal(format!(
            "contexts ({}) and metadata ({}) disagree with final_results ({})",
            result.contexts.len(),
            result.metadata.len(),
            result.final_results
        )));
    }

    let stats = [result.avg_score, result.max_score, result.min_score];
    if stats.iter().any(|s| !s.is_finite()) {
        return Err(PipelineError::Internal(format!(
            "non-finite score statistics: {:?}",
            stats
        )));
    }

    Ok(())
}
