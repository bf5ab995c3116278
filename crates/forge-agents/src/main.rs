use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use forge_agents::{
    DocumentIngestor, ForgeConfig, OllamaProvider, Orchestrator, ReportGenerator,
};

/// Privacy-preserving multi-agent research gap detector.
#[derive(Parser)]
#[command(name = "forge-agents", version)]
struct Cli {
    /// Documents to analyze (.txt or .md)
    #[arg(required = true)]
    documents: Vec<PathBuf>,

    /// Research goal guiding the analysis
    #[arg(long, default_value = "")]
    goal: String,

    /// Ollama model to use
    #[arg(long)]
    model: Option<String>,

    /// Base URL of the Ollama server
    #[arg(long)]
    base_url: Option<String>,

    /// Evolutionary rounds before finalizing
    #[arg(long)]
    iterations: Option<u32>,

    /// Privacy budget (lower = more noise)
    #[arg(long)]
    epsilon: Option<f64>,

    /// Noise sensitivity
    #[arg(long)]
    sensitivity: Option<f64>,

    /// Directory for the generated reports
    #[arg(long, default_value = "outputs")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ForgeConfig::default();
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(iterations) = cli.iterations {
        config.max_iterations = iterations;
    }
    if let Some(epsilon) = cli.epsilon {
        config.epsilon = epsilon;
    }
    if let Some(sensitivity) = cli.sensitivity {
        config.sensitivity = sensitivity;
    }
    config.validate().context("invalid configuration")?;

    info!(
        model = %config.model,
        base_url = %config.base_url,
        iterations = config.max_iterations,
        epsilon = config.epsilon,
        "ContextForge starting"
    );

    let ingestor = DocumentIngestor::new(config.chunk_size, config.chunk_overlap);
    let (documents, rejected) = ingestor.ingest_batch(&cli.documents);
    for err in &rejected {
        warn!(error = %err, "Document rejected");
    }
    if documents.is_empty() {
        anyhow::bail!("no readable documents in the input set");
    }
    info!(count = documents.len(), "Documents ingested");

    // An unreachable backend is fatal before any stage runs.
    let provider = OllamaProvider::new(&config.base_url, &config.model);
    provider
        .probe()
        .await
        .context("generation backend unavailable")?;

    let output_dir = cli.output_dir.clone();
    let mut orchestrator = Orchestrator::new(provider, config)?;
    let state = orchestrator.run(documents, &cli.goal).await?;

    let saved = ReportGenerator::new()
        .save(&state, &output_dir)
        .context("failed to write reports")?;

    info!(
        markdown = %saved.markdown.display(),
        json = %saved.json.display(),
        "Reports written"
    );
    info!(
        gaps = state.gaps.len(),
        hypotheses = state.hypotheses.len(),
        finalists = state.final_hypotheses.len(),
        messages = state.mcp_messages.len(),
        "Run complete"
    );

    Ok(())
}
