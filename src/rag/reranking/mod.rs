// Re-ranking of retrieved candidates
pub mod scorer;

pub use scorer::{jaccard, ReRankConfig, ReRanker};
