// Deduplication and exact-match metadata filtering
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::rag::types::{sort_by_score_desc, Metadata, ScoredDocument};

/// Collapse documents with identical text, keeping the best-scored instance.
///
/// Survivors are sorted by descending score; ties keep first-seen order. When
/// two copies share the top score the earlier one wins.
pub fn deduplicate(documents: Vec<ScoredDocument>) -> Vec<ScoredDocument> {
    let mut kept: Vec<ScoredDocument> = Vec::with_capacity(documents.len());
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(documents.len());

    for doc in documents {
        match positions.get(&doc.text) {
            Some(&idx) => {
                if doc.score > kept[idx].score {
                    kept[idx] = doc;
                }
            }
            None => {
                positions.insert(doc.text.clone(), kept.len());
                kept.push(doc);
            }
        }
    }

    sort_by_score_desc(&mut kept);
    kept
}

/// Exact-equality predicate over metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilter {
    required: Metadata,
}

impl MetadataFilter {
    pub fn new(required: Metadata) -> Self {
        Self { required }
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    /// Every required pair is present with an equal value
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.required
            .iter()
            .all(|(key, value)| metadata.get(key) == Some(value))
    }

    /// Keep matching documents, order unchanged
    pub fn apply(&self, documents: Vec<ScoredDocument>) -> Vec<ScoredDocument> {
        if self.is_empty() {
            return documents;
        }
        documents
            .into_iter()
            .filter(|doc| self.matches(&doc.metadata))
            .collect()
    }
}
