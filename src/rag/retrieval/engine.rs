// Retrieval engine: dispatches a query to the configured strategy
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::StageError;
use crate::memory::{EmbeddingProvider, SearchRequest, VectorStore};
use crate::rag::retrieval::bm25::Bm25Scorer;
use crate::rag::retrieval::dense::{bounded, DenseScorer};
use crate::rag::retrieval::fusion::RankFuser;
use crate::rag::types::{RetrievalConfig, RetrievalStrategy, ScoredDocument};

/// `max_results` used when listing a whole store for keyword scoring.
// TODO: replace the wide zero-vector search with a store-side inverted index
// once a backend exposes one; this is linear in corpus size per query.
pub const ENUMERATION_LIMIT: usize = 10_000;

/// Produces the initial ranked candidate list for one query string
#[derive(Clone)]
pub struct RetrievalEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    dense: DenseScorer,
    bm25: Bm25Scorer,
    fuser: RankFuser,
    timeout: Option<Duration>,
}

impl RetrievalEngine {
    /// Create new retrieval engine
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            dense: DenseScorer::new(embedder.clone(), store.clone()),
            embedder,
            store,
            bm25: Bm25Scorer::default(),
            fuser: RankFuser::default(),
            timeout: None,
        }
    }

    /// Bound every external call made by this engine
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.dense = self.dense.with_timeout(timeout);
        self.timeout = timeout;
        self
    }

    /// Retrieve candidates; a failed strategy yields an empty list
    pub async fn retrieve(&self, query: &str, config: &RetrievalConfig) -> Vec<ScoredDocument> {
        let strategy = config.strategy;
        let documents = match strategy {
            RetrievalStrategy::Dense => collapse(strategy, self.dense(query, config).await),
            RetrievalStrategy::Keyword => collapse(strategy, self.keyword(query, config).await),
            RetrievalStrategy::Hybrid => self.hybrid(query, config).await,
        };

        debug!(%strategy, query, candidates = documents.len(), "retrieved");
        documents
    }

    /// Dense nearest neighbours
    pub async fn dense(
        &self,
        query: &str,
        config: &RetrievalConfig,
    ) -> Result<Vec<ScoredDocument>, StageError> {
        self.dense.search(query, config).await
    }

    /// BM25 over the whole enumerated corpus, cut to `top_k`
    pub async fn keyword(
        &self,
        query: &str,
        config: &RetrievalConfig,
    ) -> Result<Vec<ScoredDocument>, StageError> {
        if !self.store.supports_enumeration() {
            return Err(StageError::EnumerationUnsupported {
                store_type: config.store_type.clone(),
            });
        }

        let request = SearchRequest {
            embedding: vec![0.0; self.embedder.dimension()],
            max_results: ENUMERATION_LIMIT,
            min_score: 0.0,
            store_type: config.store_type.clone(),
            tenant_id: config.tenant_id.clone(),
        };
        let corpus: Vec<ScoredDocument> = bounded(self.timeout, self.store.search(&request))
            .await?
            .into_iter()
            .map(ScoredDocument::from)
            .collect();

        let mut scored = self.bm25.score(query, corpus);
        scored.truncate(config.top_k);
        Ok(scored)
    }

    /// Dense and keyword run concurrently, then fused with RRF.
    ///
    /// Each half fails soft on its own, so one working signal is enough.
    pub async fn hybrid(&self, query: &str, config: &RetrievalConfig) -> Vec<ScoredDocument> {
        let (dense, keyword) = tokio::join!(self.dense(query, config), self.keyword(query, config));
        let dense = collapse(RetrievalStrategy::Dense, dense);
        let keyword = collapse(RetrievalStrategy::Keyword, keyword);

        let mut fused = self.fuser.fuse(&[dense.as_slice(), keyword.as_slice()]);
        fused.truncate(config.top_k);
        fused
    }
}

fn collapse(
    strategy: RetrievalStrategy,
    result: Result<Vec<ScoredDocument>, StageError>,
) -> Vec<ScoredDocument> {
    result.unwrap_or_else(|e| {
        warn!(%strategy, error = %e, "retrieval stage failed, continuing with no candidates");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryStore, StoredMatch};
    use crate::rag::types::Metadata;
    use async_trait::async_trait;

    struct FixedEmbedder(Result<Vec<f32>, StageError>);

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, StageError> {
            self.0.clone()
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct OpaqueStore;

    #[async_trait]
    impl VectorStore for OpaqueStore {
        async fn search(&self, _request: &SearchRequest) -> Result<Vec<StoredMatch>, StageError> {
            Ok(vec![StoredMatch {
                text: "only via dense".to_string(),
                metadata: Metadata::new(),
                score: 0.9,
            }])
        }
    }

    async fn store() -> Arc<InMemoryStore> {
        let store = InMemoryStore::new();
        store.add("", "the cat sat", Metadata::new(), vec![0.0, 1.0]).await;
        store.add("", "the dog sat", Metadata::new(), vec![1.0, 0.0]).await;
        Arc::new(store)
    }

    fn config(strategy: RetrievalStrategy) -> RetrievalConfig {
        RetrievalConfig {
            strategy,
            min_score: 0.5,
            ..RetrievalConfig::new("cat")
        }
    }

    #[tokio::test]
    async fn test_keyword_strategy_scores_bm25() {
        let engine = RetrievalEngine::new(Arc::new(FixedEmbedder(Ok(vec![1.0, 0.0]))), store().await);
        let docs = engine.retrieve("cat", &config(RetrievalStrategy::Keyword)).await;

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "the cat sat");
    }

    #[tokio::test]
    async fn test_dense_strategy_uses_embedding() {
        let engine = RetrievalEngine::new(Arc::new(FixedEmbedder(Ok(vec![1.0, 0.0]))), store().await);
        let docs = engine.retrieve("cat", &config(RetrievalStrategy::Dense)).await;

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "the dog sat");
    }

    #[tokio::test]
    async fn test_hybrid_fuses_both_signals() {
        let engine = RetrievalEngine::new(Arc::new(FixedEmbedder(Ok(vec![1.0, 0.0]))), store().await);
        let docs = engine.retrieve("cat", &config(RetrievalStrategy::Hybrid)).await;

        assert_eq!(docs.len(), 2);
        // one rank-0 hit each; dense list is fused first
        assert_eq!(docs[0].text, "the dog sat");
        assert_eq!(docs[0].score, docs[1].score);
    }

    #[tokio::test]
    async fn test_hybrid_survives_embedding_failure() {
        let embedder = FixedEmbedder(Err(StageError::Embedding("down".to_string())));
        let engine = RetrievalEngine::new(Arc::new(embedder), store().await);
        let docs = engine.retrieve("cat", &config(RetrievalStrategy::Hybrid)).await;

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "the cat sat");
    }

    #[tokio::test]
    async fn test_dense_failure_is_empty() {
        let embedder = FixedEmbedder(Err(StageError::Embedding("down".to_string())));
        let engine = RetrievalEngine::new(Arc::new(embedder), store().await);
        assert!(engine.retrieve("cat", &config(RetrievalStrategy::Dense)).await.is_empty());
    }

    #[tokio::test]
    async fn test_keyword_requires_enumeration() {
        let engine = RetrievalEngine::new(Arc::new(FixedEmbedder(Ok(vec![1.0, 0.0]))), Arc::new(OpaqueStore));
        let err = engine
            .keyword("cat", &config(RetrievalStrategy::Keyword))
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::EnumerationUnsupported { .. }));
        assert!(engine.retrieve("cat", &config(RetrievalStrategy::Keyword)).await.is_empty());
    }

    #[tokio::test]
    async fn test_keyword_truncates_to_top_k() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store.add("", &format!("cat number {}", i), Metadata::new(), vec![1.0, 0.0]).await;
        }
        let engine = RetrievalEngine::new(Arc::new(FixedEmbedder(Ok(vec![1.0, 0.0]))), Arc::new(store));
        let cfg = RetrievalConfig {
            top_k: 3,
            final_k: 1,
            ..config(RetrievalStrategy::Keyword)
        };

        assert_eq!(engine.retrieve("cat", &cfg).await.len(), 3);
    }
}
