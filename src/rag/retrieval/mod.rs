// Retrieval strategies: dense, keyword (BM25), hybrid (RRF)
pub mod bm25;
pub mod dense;
pub mod engine;
pub mod fusion;

pub use bm25::Bm25Scorer;
pub use dense::DenseScorer;
pub use engine::{RetrievalEngine, ENUMERATION_LIMIT};
pub use fusion::{RankFuser, RRF_K};
