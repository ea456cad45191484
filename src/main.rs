mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod workflow;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::outline::{self, OutlineCommandArgs};
use crate::config::{AppConfig, SinkConfig, SourceConfig};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::google_docs::GoogleDocsClient;
use crate::infra::json_rows::JsonRowsFile;
use crate::infra::markdown::MarkdownFile;
use crate::infra::sheets::GoogleSheetsClient;
use crate::services::{DocumentSink, RowSource};

#[derive(Parser)]
#[command(
    name = "ticket-outline",
    author,
    version,
    about = "Outline support tickets grouped by organization"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read ticket rows and write a fresh outline document.
    Generate(GenerateArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Title of the generated document.
    #[arg(short, long)]
    title: Option<String>,
    /// Read rows from a local JSON file instead of the configured source.
    #[arg(long)]
    rows_file: Option<PathBuf>,
    /// Write Markdown into this directory instead of the configured sink.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,ticket_outline=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => {
            config_cmd::run(args.command)?;
            Ok(())
        }
        Commands::Generate(args) => run_generate(args).await,
    }
}

async fn run_generate(args: GenerateArgs) -> AppResult<()> {
    let mut config = AppConfig::load()?;
    if let Some(path) = args.rows_file {
        config.source = SourceConfig::File(path);
    }
    if let Some(output_dir) = args.output_dir {
        config.sink = SinkConfig::Markdown { output_dir };
    }

    let row_source: Arc<dyn RowSource> = match &config.source {
        SourceConfig::Sheets { sheet_id, range } => {
            if sheet_id.is_none() {
                warn!("sheet id not configured; reading rows will fail");
            }
            Arc::new(GoogleSheetsClient::new(
                sheet_id.clone(),
                range.clone(),
                config.google_access_token.clone(),
            ))
        }
        SourceConfig::File(path) => Arc::new(JsonRowsFile::new(path.clone())),
    };

    let document_sink: Arc<dyn DocumentSink> = match &config.sink {
        SinkConfig::GoogleDocs => {
            Arc::new(GoogleDocsClient::new(config.google_access_token.clone()))
        }
        SinkConfig::Markdown { output_dir } => Arc::new(MarkdownFile::new(output_dir.clone())),
    };

    if config.google_access_token.is_none()
        && (matches!(config.source, SourceConfig::Sheets { .. })
            || matches!(config.sink, SinkConfig::GoogleDocs))
    {
        warn!("Google access token not configured; Google API calls will fail");
    }

    let context = AppContext::new(config, row_source, document_sink);

    let outcome = outline::run(&context, OutlineCommandArgs { title: args.title }).await?;

    println!(
        "Outlined {} tickets across {} organizations.",
        outcome.tickets, outcome.organizations
    );
    println!("Document: {}", outcome.document.location);

    Ok(())
}
