//! Command-line argument parsing for ragsift
//!
//! Provides clap-based CLI with per-request overrides and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Settings;
use crate::errors::{PipelineError, Result};
use crate::rag::types::{RetrievalConfig, RetrievalStrategy};

/// ragsift - retrieve, fuse, re-rank and diversify passages for RAG
#[derive(Parser, Debug)]
#[command(name = "ragsift")]
#[command(version)]
#[command(about = "Retrieval and re-ranking pipeline for retrieval-augmented generation", long_about = None)]
pub struct Args {
    /// Natural-language query
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// JSONL corpus loaded into the in-memory store
    #[arg(long, value_name = "FILE")]
    pub corpus: Option<PathBuf>,

    /// Retrieval strategy: dense, keyword or hybrid
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Candidates kept after retrieval
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Passages returned
    #[arg(long)]
    pub final_k: Option<usize>,

    /// Minimum dense similarity (0.0 to 1.0)
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Force semantic re-ranking on
    #[arg(long, conflicts_with = "no_rerank")]
    pub rerank: bool,

    /// Force semantic re-ranking off
    #[arg(long)]
    pub no_rerank: bool,

    /// Force MMR diversity selection on
    #[arg(long, conflicts_with = "no_diversity")]
    pub diversity: bool,

    /// Force MMR diversity selection off
    #[arg(long)]
    pub no_diversity: bool,

    /// Force query expansion on
    #[arg(long, conflicts_with = "no_expand")]
    pub expand: bool,

    /// Force query expansion off
    #[arg(long)]
    pub no_expand: bool,

    /// Metadata filter KEY=VALUE (repeatable); VALUE is parsed as JSON when possible
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Tenant routing hint
    #[arg(long)]
    pub tenant: Option<String>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Display current configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Verbosity {
    /// Log level for this verbosity; `None` keeps the configured level
    pub fn log_level(&self) -> Option<&'static str> {
        match self {
            Self::Quiet => Some("warn"),
            Self::Normal => None,
            Self::Verbose => Some("debug"),
            Self::VeryVerbose => Some("trace"),
        }
    }
}

/// Split `key=value`; the value is JSON if it parses, a string otherwise
pub fn parse_filter(raw: &str) -> Result<(String, serde_json::Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| PipelineError::invalid("filters", format!("expected KEY=VALUE, got '{}'", raw)))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(PipelineError::invalid("filters", format!("empty key in '{}'", raw)));
    }

    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Check if a query is required and provided
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.command.is_none() && self.query.is_none() {
            return Err("Query required. Use 'ragsift <QUERY>' or run a subcommand.".to_string());
        }

        if self.command.is_some() && self.query.is_some() {
            return Err("Cannot specify a query with subcommands.".to_string());
        }

        Ok(())
    }

    /// Apply command-line overrides on top of a request built from settings
    pub fn apply_overrides(&self, config: &mut RetrievalConfig) -> Result<()> {
        if let Some(strategy) = &self.strategy {
            config.strategy = strategy.parse::<RetrievalStrategy>()?;
        }
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
        if let Some(final_k) = self.final_k {
            config.final_k = final_k;
        }
        if let Some(min_score) = self.min_score {
            config.min_score = min_score;
        }
        if let Some(on) = toggle(self.rerank, self.no_rerank) {
            config.enable_reranking = on;
        }
        if let Some(on) = toggle(self.diversity, self.no_diversity) {
            config.enable_diversity = on;
        }
        if let Some(on) = toggle(self.expand, self.no_expand) {
            config.enable_query_expansion = on;
        }
        if let Some(tenant) = &self.tenant {
            config.tenant_id = tenant.clone();
        }
        for raw in &self.filters {
            let (key, value) = parse_filter(raw)?;
            config.filters.insert(key, value);
        }
        Ok(())
    }

    /// Request for this invocation: settings defaults, then flags, then validation.
    ///
    /// Runs before the embedder or store is built, so a bad request never
    /// touches the corpus file or the network.
    pub fn build_request(&self, settings: &Settings) -> Result<RetrievalConfig> {
        let mut request = settings.request(self.query.clone().unwrap_or_default());
        self.apply_overrides(&mut request)?;
        request.validate()?;
        Ok(request)
    }
}

/// `--x` / `--no-x` pair; `None` keeps the configured value
fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
