// JSONL corpus loader for the in-memory store
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

use crate::memory::embedding::EmbeddingProvider;
use crate::memory::vector_db::InMemoryStore;
use crate::rag::types::Metadata;

/// One line of a corpus file
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusRecord {
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
    /// Precomputed embedding; computed through the provider when absent
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    /// Partition override; falls back to the loader's tenant
    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// Parse JSONL content. Blank lines are skipped.
pub fn parse_records(contents: &str) -> Result<Vec<CorpusRecord>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid corpus record on line {}", idx + 1))
        })
        .collect()
}

/// Embed and insert records. Returns how many were stored.
///
/// A record whose embedding fails is stored with a zero vector so it stays
/// reachable through keyword retrieval.
pub async fn load_records(
    store: &InMemoryStore,
    embedder: &dyn EmbeddingProvider,
    records: Vec<CorpusRecord>,
    default_tenant: &str,
) -> usize {
    let mut stored = 0;

    for record in records {
        let embedding = match record.embedding {
            Some(embedding) => embedding,
            None => match embedder.embed(&record.text).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    warn!(error = %e, "embedding failed, storing zero vector");
                    vec![0.0; embedder.dimension()]
                }
            },
        };

        let tenant = record.tenant_id.as_deref().unwrap_or(default_tenant);
        store.add(tenant, &record.text, record.metadata, embedding).await;
        stored += 1;
    }

    debug!(stored, "corpus loaded");
    stored
}

/// Read a JSONL file into the store
pub async fn load_file(
    store: &InMemoryStore,
    embedder: &dyn EmbeddingProvider,
    path: &Path,
    default_tenant: &str,
) -> Result<usize> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read corpus file {}", path.display()))?;
    let records = parse_records(&contents)?;
    Ok(load_records(store, embedder, records, default_tenant).await)
}
