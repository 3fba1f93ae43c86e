//! External capabilities the retrieval pipeline consumes
//!
//! Components:
//! - Embedding: text -> vector provider trait and an Ollama client
//! - Vector DB: ranked similarity search trait, in-memory and Qdrant stores
//! - Corpus: JSONL loader for the in-memory store

pub mod corpus;
pub mod embedding;
pub mod vector_db;

pub use embedding::{EmbeddingProvider, OllamaEmbedder};
pub use vector_db::{InMemoryStore, QdrantStore, SearchRequest, StoredMatch, VectorStore};
