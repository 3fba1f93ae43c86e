//! Error types for ragsift
//!
//! Two families: `PipelineError` reaches the caller and aborts the request,
//! `StageError` stays inside a retrieval stage and degrades it to an empty
//! candidate list.

use thiserror::Error;

/// Fatal errors surfaced to callers of the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Request rejected before any I/O was issued
    #[error("Invalid retrieval config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// An internal invariant did not hold
    #[error("Internal pipeline failure: {0}")]
    Internal(String),

    /// Settings file could not be read, parsed or validated
    #[error("Settings error: {0}")]
    Settings(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl PipelineError {
    /// True when the caller has to fix its input rather than retry
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. } | Self::Settings(_))
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Soft failures of a single retrieval stage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    /// Embedding provider failed (network, timeout, bad payload)
    #[error("Embedding provider error: {0}")]
    Embedding(String),

    /// Vector store call failed
    #[error("Vector store error: {0}")]
    Store(String),

    /// Keyword retrieval needs a store that can list its whole corpus
    #[error("Store '{store_type}' cannot enumerate its documents")]
    EnumerationUnsupported { store_type: String },

    /// Call exceeded the configured stage timeout
    #[error("Stage timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
