//! ragsift - CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use ragsift::{
    cli::{Args, Commands},
    config::Settings,
    memory::{corpus, EmbeddingProvider, InMemoryStore, OllamaEmbedder, QdrantStore, VectorStore},
    rag::{RetrievalPipeline, RetrievalResult},
    telemetry,
};

/// Print settings, or write the default file
fn run_config(settings: &Settings, args: &Args, init: bool) -> Result<()> {
    if init {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => Settings::default_path().context("Could not determine home directory")?,
        };
        Settings::default()
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{} {}", "Wrote".green(), path.display());
        return Ok(());
    }

    let rendered = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
    println!("{}", rendered);
    Ok(())
}

/// Build the store named by the settings, filling it from `--corpus` when in memory
async fn build_store(
    settings: &Settings,
    args: &Args,
    embedder: &dyn EmbeddingProvider,
    tenant_id: &str,
) -> Result<Arc<dyn VectorStore>> {
    match settings.store.backend.as_str() {
        "qdrant" => {
            let store = QdrantStore::new(&settings.store.qdrant_url, settings.store.collection.clone())
                .context("Failed to connect to Qdrant")?;
            Ok(Arc::new(store))
        }
        _ => {
            let store = InMemoryStore::new();
            if let Some(path) = &args.corpus {
                let stored = corpus::load_file(&store, embedder, path, tenant_id).await?;
                info!(stored, path = %path.display(), "corpus loaded");
            }
            Ok(Arc::new(store))
        }
    }
}

fn print_result(result: &RetrievalResult) {
    println!(
        "{} {} of {} candidates (avg {:.3}, max {:.3}, min {:.3}){}",
        "Retrieved".green().bold(),
        result.final_results,
        result.results_retrieved,
        result.avg_score,
        result.max_score,
        result.min_score,
        if result.reranked { ", reranked" } else { "" }
    );

    for (idx, (context, metadata)) in result.contexts.iter().zip(&result.metadata).enumerate() {
        println!();
        println!("{}", format!("[{}]", idx + 1).cyan().bold());
        println!("{}", context);
        if !metadata.is_empty() {
            println!("{}", serde_json::Value::Object(metadata.clone()).to_string().dimmed());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(e) = args.validate() {
        eprintln!("{}: {}", "Error".red(), e);
        std::process::exit(2);
    }

    let settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    let level = args
        .verbosity()
        .log_level()
        .unwrap_or(settings.logging.level.as_str());
    telemetry::init_logging(level, settings.logging.json);

    if let Some(Commands::Config { init }) = &args.command {
        return run_config(&settings, &args, *init);
    }

    let request = args.build_request(&settings)?;

    let embedder = Arc::new(
        OllamaEmbedder::new(
            settings.ollama_url(),
            settings.embedding.model.clone(),
            settings.embedding.dimension,
            Duration::from_secs(settings.embedding.timeout_secs),
        )
        .context("Failed to create embedding client")?,
    );
    let store = build_store(&settings, &args, embedder.as_ref(), &request.tenant_id).await?;

    let pipeline = RetrievalPipeline::with_options(embedder, store, settings.pipeline_options());
    let result = pipeline.execute(&request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    Ok(())
}
