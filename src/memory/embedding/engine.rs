// Embedding provider capability and the Ollama-backed implementation
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::StageError;

/// Default embedding dimension (nomic-embed-text)
pub const DEFAULT_EMBEDDING_DIM: usize = 768;

/// Turns text into a vector. Shared across in-flight pipeline calls.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, StageError>;

    /// Length of every vector this provider produces
    fn dimension(&self) -> usize;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Embedding provider calling a local Ollama server
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimension: usize,
}

impl OllamaEmbedder {
    /// Create a new embedder
    ///
    /// # Arguments
    /// * `base_url` - Base URL for Ollama API (e.g. http://127.0.0.1:11434)
    /// * `model` - Embedding model tag
    /// * `dimension` - Expected vector length
    /// * `timeout` - Per-request HTTP timeout
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self, StageError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StageError::Embedding(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimension,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, StageError> {
        let url = format!("{}/api/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| StageError::Embedding(format!("Failed to connect to Ollama: {}", e)))?;

        if !response.status().is_success() {
            return Err(StageError::Embedding(format!(
                "Ollama API error: {}",
                response.status()
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| StageError::Embedding(format!("Failed to parse response: {}", e)))?;

        if body.embedding.len() != self.dimension {
            return Err(StageError::Embedding(format!(
                "Expected {} dimensions, got {}",
                self.dimension,
                body.embedding.len()
            )));
        }

        Ok(body.embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
