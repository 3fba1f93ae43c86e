//! ragsift - retrieval and re-ranking for retrieval-augmented generation
//!
//! Given a query and a pool of embedded text segments, produces a ranked,
//! deduplicated, diversified and filtered shortlist of passages.
//!
//! # Architecture
//!
//! - **rag**: tokenizer, BM25, dense scoring, RRF, expansion, dedup/filter,
//!   re-ranking, MMR and the orchestrating pipeline
//! - **memory**: embedding-provider and vector-store capabilities
//! - **config / cli / telemetry**: settings file, argument parsing, logging

pub mod errors;
pub mod config;
pub mod cli;
pub mod telemetry;
pub mod memory;
pub mod rag;

// Re-export commonly used types
pub use errors::{PipelineError, Result, StageError};
pub use config::Settings;
pub use rag::{RetrievalConfig, RetrievalPipeline, RetrievalResult, RetrievalStrategy, ScoredDocument};
