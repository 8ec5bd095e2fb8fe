//! docchat - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use docchat::{
    bootstrap::{Bootstrap, BootstrapStatus, EXIT_CODE_SETUP_NEEDED},
    cli::{Args, Commands, Config},
    doctor::Doctor,
    embedding::{CandleEmbedder, Embedder, EmbeddingBackend, OllamaEmbedder},
    generation::OllamaGenerator,
    ingest::{write_chunk_file, Ingestor},
    logging,
    repl::{DisplayManager, ReplSession},
    ChatPipeline, ChatReply, ChunkStore, RetrievalEngine,
};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init(args.verbosity());

    if let Err(e) = run(args).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_args(&args)?;

    let verbosity = args.verbosity();
    let display = DisplayManager::with_options(verbosity.show_progress(), verbosity.show_scores());

    match args.command() {
        Commands::Chat => run_chat(&config, display).await,
        command @ Commands::Ask { .. } => {
            let question = command.text().unwrap_or_default();
            run_ask(&config, display, &question).await
        }
        command @ Commands::Search { .. } => {
            let query = command.text().unwrap_or_default();
            run_search(&config, display, &query).await
        }
        Commands::Ingest { dir, output } => run_ingest(&config, display, dir, output).await,
        Commands::Doctor => run_doctor(&config).await,
        Commands::Config => show_config(&config),
    }
}

/// Interactive chat session
async fn run_chat(config: &Config, display: DisplayManager) -> Result<()> {
    let store = load_store(config)?;
    ensure_ollama(config).await;

    let pipeline = build_pipeline(config, store.clone()).await?;
    let mut session = ReplSession::with_history(config.history_file(), config.search_params(), display)?;

    session.show_welcome(
        env!("CARGO_PKG_VERSION"),
        &config.ollama.chat_model,
        store.len(),
        store.document_counts().len(),
    );
    session.run(&pipeline).await
}

/// Single question
async fn run_ask(config: &Config, mut display: DisplayManager, question: &str) -> Result<()> {
    let store = load_store(config)?;
    ensure_ollama(config).await;
    let pipeline = build_pipeline(config, store).await?;

    let start = Instant::now();
    display.start_spinner("Searching documents...");
    match pipeline.answer(question).await {
        Ok(reply) => {
            display.show_reply(&reply, start.elapsed().as_millis() as u64);
            if matches!(reply, ChatReply::GenerationFailed { .. }) {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            display.show_error(ChatPipeline::fallback_message(question, &e));
            std::process::exit(1);
        }
    }
}

/// Ranked passages only, no generation
async fn run_search(config: &Config, mut display: DisplayManager, query: &str) -> Result<()> {
    let store = load_store(config)?;
    let embedder = build_embedder(config).await?;
    let engine = RetrievalEngine::with_params(store, embedder, config.search_params())?;

    display.start_spinner("Searching documents...");
    let results = engine.retrieve(query, config.retrieval.top_k).await;
    display.finish_current();

    let results = results.context("Search failed")?;
    display.show_search_results(query, &results, config.retrieval.min_score);
    Ok(())
}

/// Build the chunk file from a directory of documents
async fn run_ingest(
    config: &Config,
    mut display: DisplayManager,
    dir: PathBuf,
    output: Option<PathBuf>,
) -> Result<()> {
    let output = output.unwrap_or_else(|| config.chunk_file());
    let embedder = build_embedder(config).await?;
    let ingestor = Ingestor::with_window(embedder, config.ingest.chunk_size, config.ingest.chunk_overlap);

    display.start_spinner(&format!("Ingesting {}...", dir.display()));
    let report = ingestor.ingest_dir(&dir).await;
    display.finish_current();
    let report = report.with_context(|| format!("Failed to ingest {}", dir.display()))?;

    for document in &report.documents {
        println!("  {} -> {} chunks", document.source_document, document.chunk_count);
    }

    write_chunk_file(&output, &report.chunks)?;
    println!(
        "{} {} chunks from {} documents written to {}",
        "✓".green(),
        report.chunk_count(),
        report.documents.len(),
        output.display()
    );
    Ok(())
}

async fn run_doctor(config: &Config) -> Result<()> {
    let checks = Doctor::new(config).run_diagnostics().await;
    Doctor::display_results(&checks);

    if !Doctor::overall_status(&checks) {
        std::process::exit(1);
    }
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    if let Some(path) = Config::default_path() {
        println!("# {}", path.display());
    }
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Load the chunk file; failures are fatal
fn load_store(config: &Config) -> Result<Arc<ChunkStore>> {
    let path = config.chunk_file();
    let store = ChunkStore::load(&path)
        .with_context(|| format!("Cannot start without a valid chunk file ({})", path.display()))?;

    if store.is_empty() {
        tracing::warn!(path = %path.display(), "Chunk file is empty, every question will go unanswered");
    }
    Ok(Arc::new(store))
}

/// Exit with setup instructions when Ollama or the chat model is missing
async fn ensure_ollama(config: &Config) {
    let bootstrap = Bootstrap::new(&config.ollama_url());
    let mut models = vec![config.ollama.chat_model.as_str()];
    if let Some(light) = &config.ollama.light_model {
        models.push(light.as_str());
    }
    if config.embedding.backend == EmbeddingBackend::Ollama {
        models.push(config.embedding.model.as_str());
    }

    match bootstrap.check(&models).await {
        Ok(BootstrapStatus::Ready) => {}
        Ok(BootstrapStatus::OllamaNotRunning) => {
            Bootstrap::show_ollama_install_instructions();
            std::process::exit(EXIT_CODE_SETUP_NEEDED);
        }
        Ok(BootstrapStatus::ModelNotAvailable(model)) => {
            Bootstrap::show_model_pull_instructions(&model);
            std::process::exit(EXIT_CODE_SETUP_NEEDED);
        }
        Err(e) => tracing::warn!(error = %e, "Could not verify Ollama models"),
    }
}

async fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match config.embedding.backend {
        EmbeddingBackend::Candle => {
            let model_id = config.embedding.model.clone();
            let embedder = tokio::task::spawn_blocking(move || CandleEmbedder::new(&model_id))
                .await
                .context("Embedding model loader panicked")??;
            Arc::new(embedder)
        }
        EmbeddingBackend::Ollama => Arc::new(OllamaEmbedder::new(
            &config.ollama_url(),
            &config.embedding.model,
            config.embedding.dimension,
        )?),
    };

    if let (Some(declared), Some(actual)) = (config.embedding.dimension, embedder.dimension()) {
        if declared != actual {
            anyhow::bail!(
                "Configured embedding dimension {} does not match {} ({})",
                declared,
                embedder.name(),
                actual
            );
        }
    }

    tracing::info!(embedder = %embedder.name(), "Embedder ready");
    Ok(embedder)
}

async fn build_pipeline(config: &Config, store: Arc<ChunkStore>) -> Result<ChatPipeline> {
    let embedder = build_embedder(config).await?;
    let engine = RetrievalEngine::with_params(store, embedder, config.search_params())?;
    let generator = OllamaGenerator::with_config(&config.ollama_url(), config.generator_settings())?;
    Ok(ChatPipeline::new(engine, Arc::new(generator)))
}
