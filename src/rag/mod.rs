// Retrieval-and-reranking pipeline
//
// Turns a natural-language query and a pool of embedded segments into a
// ranked, deduplicated, diversified shortlist for a generation step.
//
// Components:
// - Tokenizer / BM25: lexical scoring
// - Retrieval Engine: dense, keyword and hybrid (RRF) candidate generation
// - Query Expansion: synonym and question reformulations
// - Filter: dedup and exact-match metadata predicate
// - Re-ranking: retrieval score blended with Jaccard overlap
// - Diversity: MMR selection
// - Pipeline: fixed-order orchestration and result statistics

pub mod diversity;
pub mod expansion;
pub mod filter;
pub mod pipeline;
pub mod reranking;
pub mod retrieval;
pub mod tokenizer;
pub mod types;

// Re-export key types
pub use diversity::DiversitySelector;
pub use expansion::QueryExpander;
pub use filter::{deduplicate, MetadataFilter};
pub use pipeline::{PipelineOptions, RetrievalPipeline};
pub use reranking::ReRanker;
pub use retrieval::{Bm25Scorer, DenseScorer, RankFuser, RetrievalEngine};
pub use types::{Metadata, RetrievalConfig, RetrievalResult, RetrievalStrategy, ScoredDocument};
