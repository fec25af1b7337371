use std::path::{Path, PathBuf};

use airspace_core::{
    config::{ProcessorConfig, SourceConfig},
    db::{self, PostgresRowSource},
    invocation, pipeline,
    source::{CsvRowSource, RowSource, SourceError},
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use polars::prelude::DataFrame;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Airspace order report processor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the order report and deliver it to the configured destination
    Run(SourceArgs),
    /// Run through the invocation handler and print the response envelope
    Invoke(InvokeArgs),
}

#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// Processor config (TOML); falls back to AIRSPACE_CONFIG, then defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Read segments from this CSV instead of the configured source
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct InvokeArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// JSON file holding the invocation event
    #[arg(long)]
    event: Option<PathBuf>,
}

/// The row source picked from config or the `--input` override.
enum ConfiguredSource {
    Csv(CsvRowSource),
    Postgres(PostgresRowSource),
}

impl RowSource for ConfiguredSource {
    async fn fetch_segments(&self) -> Result<DataFrame, SourceError> {
        match self {
            ConfiguredSource::Csv(source) => source.fetch_segments().await,
            ConfiguredSource::Postgres(source) => source.fetch_segments().await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args).await,
        Command::Invoke(args) => handle_invoke(args).await,
    }
}

async fn handle_run(args: SourceArgs) -> Result<()> {
    let config = ProcessorConfig::resolve(args.config.as_deref())?;
    let source = build_source(&config, args.input.as_deref()).await?;

    let report = pipeline::run(&source).await?;
    report
        .deliver(&config.report)
        .context("failed to deliver order report")?;

    info!(orders = report.len(), "Order report complete");
    Ok(())
}

async fn handle_invoke(args: InvokeArgs) -> Result<()> {
    let config = ProcessorConfig::resolve(args.source.config.as_deref())?;
    let source = build_source(&config, args.source.input.as_deref()).await?;

    let event = match args.event.as_deref() {
        Some(path) => read_event(path)?,
        None => Value::Object(Default::default()),
    };
    let context = Value::Object(Default::default());

    let response = invocation::invoke(&event, &context, &source, &config).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.is_success() {
        Ok(())
    } else {
        anyhow::bail!("invocation failed with status {}", response.status_code)
    }
}

async fn build_source(config: &ProcessorConfig, input: Option<&Path>) -> Result<ConfiguredSource> {
    if let Some(path) = input {
        return Ok(ConfiguredSource::Csv(CsvRowSource::new(path)));
    }

    match &config.source {
        SourceConfig::Csv { path } => Ok(ConfiguredSource::Csv(CsvRowSource::new(path.clone()))),
        SourceConfig::Postgres { query, .. } => {
            let database_url = config
                .source
                .database_url()?
                .context("postgres source requires a database URL")?;
            let pool = db::connect(&database_url).await?;
            Ok(ConfiguredSource::Postgres(PostgresRowSource::new(
                pool,
                query.clone(),
            )))
        }
    }
}

fn read_event(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event {}", path.display()))?;
    serde_json::from_str(&contents).context("event is not valid JSON")
}
