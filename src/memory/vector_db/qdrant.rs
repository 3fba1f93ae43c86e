// Qdrant-backed vector store
use async_trait::async_trait;
use qdrant_client::{
    client::QdrantClient,
    qdrant::{with_payload_selector::SelectorOptions, SearchPoints, Value as QdrantValue, WithPayloadSelector},
};
use serde_json::Value as JsonValue;

use super::{SearchRequest, StoredMatch, VectorStore};
use crate::errors::StageError;
use crate::rag::types::Metadata;

/// Payload key holding the segment text
const DOCUMENT_KEY: &str = "document";

/// Vector store backed by a Qdrant server
pub struct QdrantStore {
    client: QdrantClient,
    collection: String,
}

impl QdrantStore {
    /// Connect to a Qdrant server
    pub fn new(url: &str, collection: impl Into<String>) -> Result<Self, StageError> {
        let client = QdrantClient::from_url(url)
            .build()
            .map_err(|e| StageError::Store(format!("Failed to create Qdrant client: {}", e)))?;

        Ok(Self {
            client,
            collection: collection.into(),
        })
    }

    /// Collection a tenant's segments live in
    pub fn collection_for(&self, tenant_id: &str) -> String {
        collection_name(&self.collection, tenant_id)
    }
}

fn collection_name(base: &str, tenant_id: &str) -> String {
    if tenant_id.is_empty() {
        base.to_string()
    } else {
        format!("{}_{}", base, tenant_id)
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<StoredMatch>, StageError> {
        let search_result = self
            .client
            .search_points(&SearchPoints {
                collection_name: self.collection_for(&request.tenant_id),
                vector: request.embedding.clone(),
                limit: request.max_results as u64,
                with_payload: Some(WithPayloadSelector {
                    selector_options: Some(SelectorOptions::Enable(true)),
                }),
                score_threshold: Some(request.min_score as f32),
                ..Default::default()
            })
            .await
            .map_err(|e| StageError::Store(format!("Failed to search points: {}", e)))?;

        let matches = search_result
            .result
            .into_iter()
            .map(|point| {
                let mut text = String::new();
                let mut metadata = Metadata::new();
                for (key, value) in point.payload {
                    if key == DOCUMENT_KEY {
                        text = qdrant_value_to_string(&value).unwrap_or_default();
                    } else if let Some(json_val) = qdrant_to_json_value(&value) {
                        metadata.insert(key, json_val);
                    }
                }

                StoredMatch {
                    text,
                    metadata,
                    score: point.score as f64,
                }
            })
            .collect();

        Ok(matches)
    }

    fn supports_enumeration(&self) -> bool {
        true
    }
}

fn qdrant_to_json_value(value: &QdrantValue) -> Option<JsonValue> {
    value.kind.as_ref().and_then(|kind| {
        use qdrant_client::qdrant::value::Kind;
        match kind {
            Kind::StringValue(s) => Some(JsonValue::String(s.clone())),
            Kind::IntegerValue(i) => Some(JsonValue::Number((*i).into())),
            Kind::DoubleValue(f) => serde_json::Number::from_f64(*f).map(JsonValue::Number),
            Kind::BoolValue(b) => Some(JsonValue::Bool(*b)),
            _ => None,
        }
    })
}

fn qdrant_value_to_string(value: &QdrantValue) -> Option<String> {
    value.kind.as_ref().and_then(|kind| {
        use qdrant_client::qdrant::value::Kind;
        match kind {
            Kind::StringValue(s) => Some(s.clone()),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_routing() {
        assert_eq!(collection_name("segments", ""), "segments");
        assert_eq!(collection_name("segments", "acme"), "segments_acme");
    }

    #[test]
    fn test_payload_conversion() {
        let text = QdrantValue::from("hello".to_string());
        assert_eq!(qdrant_value_to_string(&text), Some("hello".to_string()));
        assert_eq!(qdrant_to_json_value(&text), Some(JsonValue::String("hello".to_string())));

        let num = QdrantValue::from(7i64);
        assert_eq!(qdrant_to_json_value(&num), Some(serde_json::json!(7)));
        assert_eq!(qdrant_value_to_string(&num), None);

        let flag = QdrantValue::from(true);
        assert_eq!(qdrant_to_json_value(&flag), Some(JsonValue::Bool(true)));
    }

    #[tokio::test]
    #[ignore] // Integration test - requires Qdrant
    async fn test_search_integration() {
        let store = QdrantStore::new("http://localhost:6334", "segments").unwrap();
        let request = SearchRequest {
            embedding: vec![0.1; 768],
            max_results: 5,
            min_score: 0.0,
            store_type: "qdrant".to_string(),
            tenant_id: String::new(),
        };
        assert!(store.search(&request).await.is_ok());
    }
}
