// Embedding provider capability
pub mod engine;

pub use engine::{EmbeddingProvider, OllamaEmbedder, DEFAULT_EMBEDDING_DIM};
