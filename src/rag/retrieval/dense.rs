// Dense (vector similarity) scoring through the injected capabilities
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::StageError;
use crate::memory::{EmbeddingProvider, SearchRequest, VectorStore};
use crate::rag::types::{RetrievalConfig, ScoredDocument};

/// Await `fut`, mapping expiry of `limit` to `StageError::Timeout`
pub(crate) async fn bounded<T, F>(limit: Option<Duration>, fut: F) -> Result<T, StageError>
where
    F: Future<Output = Result<T, StageError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| StageError::Timeout {
                duration_ms: limit.as_millis() as u64,
            })?,
        None => fut.await,
    }
}

/// Embeds the query and asks the store for its nearest neighbours
#[derive(Clone)]
pub struct DenseScorer {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    timeout: Option<Duration>,
}

impl DenseScorer {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            timeout: None,
        }
    }

    /// Bound every embedding and store call
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Top `config.top_k` matches above `config.min_score`
    pub async fn search(
        &self,
        query: &str,
        config: &RetrievalConfig,
    ) -> Result<Vec<ScoredDocument>, StageError> {
        let embedding = bounded(self.timeout, self.embedder.embed(query)).await?;

        let request = SearchRequest {
            embedding,
            max_results: config.top_k,
            min_score: config.min_score,
            store_type: config.store_type.clone(),
            tenant_id: config.tenant_id.clone(),
        };
        let matches = bounded(self.timeout, self.store.search(&request)).await?;

        Ok(matches
            .into_iter()
            .filter(|m| m.score.is_finite())
            .map(ScoredDocument::from)
            .collect())
    }
}
