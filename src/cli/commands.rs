//! CLI command definitions for writerlens.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use crate::analysis::{LlmAggregator, LlmExtractor};
use crate::api::{self, AppState};
use crate::config::AppConfig;
use crate::jobs::{AnalysisOrchestrator, JobStatus, JobStore, PipelineDriver};
use crate::llm::OpenAiClient;
use crate::sources::FeedDiscoverer;

/// How often `analyze` polls the job while waiting.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Writer analysis service: profile an author from their public posts.
#[derive(Parser)]
#[command(name = "writerlens")]
#[command(about = "Analyze a writer's Medium or Substack posts into one writing profile")]
#[command(version)]
#[command(
    long_about = "writerlens discovers an author's recent posts, analyzes each one with text \
metrics and an LLM, and aggregates a single writing profile.\n\nExample usage:\n  \
writerlens serve --bind 0.0.0.0:8000\n  writerlens analyze https://medium.com/@author -o report.json"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the HTTP analysis service.
    Serve(ServeArgs),

    /// Analyze one author URL and print or save the report.
    Analyze(AnalyzeArgs),
}

/// Arguments for `writerlens serve`.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides WRITERLENS_BIND_ADDR).
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,
}

/// Arguments for `writerlens analyze`.
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Author URL (Medium profile or Substack blog).
    pub url: String,

    /// Write the JSON report here instead of stdout.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Parse CLI arguments without running a command.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the command carried by pre-parsed CLI arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Analyze(args) => analyze(args).await,
    }
}

/// Wires the orchestrator from configuration and environment.
fn build_orchestrator(config: &AppConfig) -> anyhow::Result<Arc<AnalysisOrchestrator>> {
    let llm = Arc::new(OpenAiClient::from_env().context("LLM configuration")?);

    let store = Arc::new(JobStore::new());
    let driver = Arc::new(PipelineDriver::new(
        store.clone(),
        Arc::new(FeedDiscoverer::new(config.max_posts)),
        Arc::new(LlmExtractor::new(llm.clone())),
        Arc::new(LlmAggregator::new(llm, config.top_theme_count)),
        config.clone().into(),
    ));

    Ok(Arc::new(AnalysisOrchestrator::new(store, driver)))
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    let orchestrator = build_orchestrator(&config)?;

    info!(
        bind_addr = %config.bind_addr,
        max_posts = config.max_posts,
        max_concurrent_extractions = config.max_concurrent_extractions,
        "Starting analysis service"
    );

    api::serve(config.bind_addr, AppState { orchestrator }).await
}

async fn analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let orchestrator = build_orchestrator(&config)?;

    let job_id = orchestrator
        .submit(&args.url)
        .with_context(|| format!("Cannot analyze '{}'", args.url))?;

    info!(job_id = %job_id, url = %args.url, "Analysis started");

    loop {
        tokio::time::sleep(POLL_INTERVAL).await;

        let Some(job) = orchestrator.status(job_id) else {
            bail!("job {job_id} disappeared from the store");
        };

        match job.status {
            JobStatus::Queued => {}
            JobStatus::Running => {
                info!(
                    items_processed = job.items_processed,
                    total_items = job.total_items,
                    progress = job.progress_percent(),
                    "Analyzing"
                );
            }
            JobStatus::Failed => {
                bail!(
                    "analysis failed: {}",
                    job.error.unwrap_or_else(|| "unknown error".to_string())
                );
            }
            JobStatus::Completed => {
                let report = job
                    .result
                    .context("completed job is missing its report")?;
                let json = serde_json::to_string_pretty(&report)?;

                match args.output {
                    Some(path) => {
                        std::fs::write(&path, json)
                            .with_context(|| format!("Cannot write report to '{path}'"))?;
                        info!(path = %path, "Report saved");
                    }
                    None => println!("{json}"),
                }
                return Ok(());
            }
        }
    }
}
