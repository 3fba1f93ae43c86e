//! Configuration management for ragsift
//!
//! TOML settings with defaults and validation.
//! Location: ~/.ragsift/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{PipelineError, Result};
use crate::memory::embedding::DEFAULT_EMBEDDING_DIM;
use crate::rag::pipeline::{PipelineOptions, DEFAULT_EXPANSION_COUNT};
use crate::rag::types::{Metadata, RetrievalConfig, RetrievalStrategy};

/// Complete configuration for ragsift
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub retrieval: RetrievalDefaults,
    pub embedding: EmbeddingSettings,
    pub store: StoreSettings,
    pub pipeline: PipelineSettings,
    pub logging: LoggingSettings,
}

/// Defaults applied to every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalDefaults {
    pub strategy: RetrievalStrategy,
    pub top_k: usize,
    pub final_k: usize,
    pub min_score: f64,
    pub enable_reranking: bool,
    pub enable_diversity: bool,
    pub enable_query_expansion: bool,
    pub store_type: String,
    pub tenant_id: String,
    pub filters: Metadata,
}

/// Ollama embedding provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub host: String,
    pub port: u16,
    pub model: String,
    pub dimension: usize,
    pub timeout_secs: u64,
}

/// Which vector store backs the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// "memory" or "qdrant"
    pub backend: String,
    pub qdrant_url: String,
    pub collection: String,
}

/// Pipeline execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// 0 disables the per-call timeout
    pub stage_timeout_ms: u64,
    pub expansion_count: usize,
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for RetrievalDefaults {
    fn default() -> Self {
        let defaults = RetrievalConfig::default();
        Self {
            strategy: defaults.strategy,
            top_k: defaults.top_k,
            final_k: defaults.final_k,
            min_score: defaults.min_score,
            enable_reranking: defaults.enable_reranking,
            enable_diversity: defaults.enable_diversity,
            enable_query_expansion: defaults.enable_query_expansion,
            filters: defaults.filters,
            store_type: defaults.store_type,
            tenant_id: defaults.tenant_id,
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11434,
            model: "nomic-embed-text".to_string(),
            dimension: DEFAULT_EMBEDDING_DIM,
            timeout_secs: 30,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            qdrant_url: "http://localhost:6334".to_string(),
            collection: "segments".to_string(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            stage_timeout_ms: 0,
            expansion_count: DEFAULT_EXPANSION_COUNT,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load settings from file or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Settings(format!("Failed to read config: {}", e)))?;

        let settings: Settings = toml::from_str(&contents)
            .map_err(|e| PipelineError::Settings(format!("Failed to parse config: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load from the standard location, or built-in defaults when absent
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(config_path) if config_path.exists() => Self::load_from_file(&config_path),
            _ => Ok(Settings::default()),
        }
    }

    /// ~/.ragsift/config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".ragsift").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.request("settings").validate().map_err(|e| match e {
            PipelineError::InvalidConfig { field, reason } => {
                PipelineError::Settings(format!("retrieval.{} {}", field, reason))
            }
            other => other,
        })?;

        match self.store.backend.as_str() {
            "memory" | "qdrant" => {}
            other => {
                return Err(PipelineError::Settings(format!(
                    "Invalid store backend: {}",
                    other
                )))
            }
        }

        if self.embedding.dimension == 0 {
            return Err(PipelineError::Settings(
                "embedding.dimension must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.expansion_count == 0 {
            return Err(PipelineError::Settings(
                "pipeline.expansion_count must be at least 1".to_string(),
            ));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(PipelineError::Settings(format!(
                    "Invalid log level: {}",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Save settings to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Settings(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Build a request for `query` from the retrieval defaults
    pub fn request(&self, query: impl Into<String>) -> RetrievalConfig {
        let r = &self.retrieval;
        RetrievalConfig {
            query: query.into(),
            top_k: r.top_k,
            final_k: r.final_k,
            min_score: r.min_score,
            strategy: r.strategy,
            enable_reranking: r.enable_reranking,
            enable_diversity: r.enable_diversity,
            enable_query_expansion: r.enable_query_expansion,
            filters: r.filters.clone(),
            store_type: r.store_type.clone(),
            tenant_id: r.tenant_id.clone(),
        }
    }

    /// Pipeline options derived from `[pipeline]`
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            stage_timeout: match self.pipeline.stage_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
            expansion_count: self.pipeline.expansion_count,
        }
    }

    /// Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.embedding.host, self.embedding.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.retrieval.strategy, RetrievalStrategy::Hybrid);
        assert_eq!(settings.retrieval.top_k, 10);
        assert_eq!(settings.embedding.dimension, 768);
        assert_eq!(settings.store.backend, "memory");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_final_k_above_top_k() {
        let mut settings = Settings::default();
        settings.retrieval.final_k = 50;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("retrieval.final_k"));
    }

    #[test]
    fn test_validation_backend() {
        let mut settings = Settings::default();
        settings.store.backend = "redis".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "loud".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [retrieval]
            strategy = "keyword"
            top_k = 20

            [retrieval.filters]
            lang = "en"
            "#,
        )
        .unwrap();

        assert_eq!(settings.retrieval.strategy, RetrievalStrategy::Keyword);
        assert_eq!(settings.retrieval.top_k, 20);
        assert_eq!(settings.retrieval.final_k, 5);
        assert_eq!(settings.retrieval.filters["lang"], "en");
        assert_eq!(settings.embedding.port, 11434);
    }

    #[test]
    fn test_request_from_defaults() {
        let settings = Settings::default();
        let request = settings.request("what is bm25");
        assert_eq!(request.query, "what is bm25");
        assert_eq!(request.top_k, settings.retrieval.top_k);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_pipeline_options_timeout() {
        let mut settings = Settings::default();
        assert!(settings.pipeline_options().stage_timeout.is_none());

        settings.pipeline.stage_timeout_ms = 1500;
        assert_eq!(
            settings.pipeline_options().stage_timeout,
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.retrieval.tenant_id = "acme".to_string();
        settings.save(&path).unwrap();

        let loaded = Settings::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_missing_file_is_settings_error() {
        let err = Settings::load(Some(Path::new("/nonexistent/ragsift.toml"))).unwrap_err();
        assert!(matches!(err, PipelineError::Settings(_)));
    }

    #[test]
    fn test_ollama_url() {
        assert_eq!(Settings::default().ollama_url(), "http://127.0.0.1:11434");
    }
}
