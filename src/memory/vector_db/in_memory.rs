// In-process vector store, partitioned by tenant
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{cosine_similarity, SearchRequest, StoredMatch, VectorStore};
use crate::errors::StageError;
use crate::rag::types::Metadata;

#[derive(Debug, Clone)]
struct Entry {
    text: String,
    metadata: Metadata,
    embedding: Vec<f32>,
}

/// Brute-force cosine store held in memory
#[derive(Default)]
pub struct InMemoryStore {
    /// tenant_id -> entries in insertion order
    partitions: RwLock<HashMap<String, Vec<Entry>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a segment to a tenant's partition
    pub async fn add(&self, tenant_id: &str, text: &str, metadata: Metadata, embedding: Vec<f32>) {
        let mut partitions = self.partitions.write().await;
        partitions
            .entry(tenant_id.to_string())
            .or_insert_with(Vec::new)
            .push(Entry {
                text: text.to_string(),
                metadata,
                embedding,
            });
    }

    /// Number of segments stored for a tenant
    pub async fn len(&self, tenant_id: &str) -> usize {
        self.partitions
            .read()
            .await
            .get(tenant_id)
            .map_or(0, Vec::len)
    }

    pub async fn is_empty(&self, tenant_id: &str) -> bool {
        self.len(tenant_id).await == 0
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<StoredMatch>, StageError> {
        let partitions = self.partitions.read().await;
        let Some(entries) = partitions.get(&request.tenant_id) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<StoredMatch> = entries
            .iter()
            .filter_map(|entry| {
                let score = cosine_similarity(&request.embedding, &entry.embedding);
                (score.is_finite() && score >= request.min_score).then(|| StoredMatch {
                    text: entry.text.clone(),
                    metadata: entry.metadata.clone(),
                    score,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(request.max_results);
        Ok(matches)
    }

    fn supports_enumeration(&self) -> bool {
        true
    }
}
