use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mapcond::catalog::Catalog;
use mapcond::config::{AppConfig, BodyKind, FetchConfig, FetchMode, load_config};
use mapcond::fetch::Fetcher;
use mapcond::harness::run_harness;
use mapcond::mcp::McpServer;
use mapcond::pipeline::ConditionsService;
use mapcond::query::{ConditionsQuery, OutputFormat, QueryError, render, resolve};
use mapcond::rest;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mapcond", about = "Map condition scraper with CLI, MCP and REST front ends")]
struct Cli {
    #[arg(long, default_value = "mapcond.toml")]
    config: PathBuf,

    /// Read the page from a local file instead of fetching it (.txt is plain text).
    #[arg(long)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Scrape {
        #[arg(long, default_value = "text")]
        format: String,
        #[arg(long)]
        save: Option<PathBuf>,
    },
    Zone {
        name: String,
        #[arg(long, default_value = "text")]
        format: String,
    },
    Active {
        #[arg(long, default_value_t = false)]
        major_only: bool,
        #[arg(long, default_value = "text")]
        format: String,
    },
    Upcoming {
        #[arg(long, default_value = "text")]
        format: String,
    },
    Zones,
    Mcp,
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    Harness,
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let mut loaded = load_config(&cli.config)?;
    if let Some(input) = &cli.input {
        loaded.config.fetch = FetchConfig::file(input, body_kind_for(input));
    }
    if let Some(path) = &loaded.path {
        info!(config = %path.display(), "config loaded");
    }
    let config = loaded.config;

    match cli.command {
        Commands::Scrape { format, save } => {
            let format: OutputFormat = format.parse()?;
            let service = ConditionsService::from_config(&config)?;
            let save_path = save.or_else(|| config.output.save_path.clone());
            match service.run(save_path) {
                Ok(report) => {
                    let resolved = resolve(&ConditionsQuery::All, format, service.catalog())?;
                    let output = render(&resolved, &report.result)?;
                    println!("{}", output.to_display_string());
                    if let Some(path) = report.saved_to {
                        println!("\nData saved to {}", path.display());
                    }
                    if let Some(err) = report.save_error {
                        println!("\nFailed to save data: {err}");
                    }
                }
                Err(err) => return report_failure(format, QueryError::Fetch(err)),
            }
        }
        Commands::Zone { name, format } => {
            answer(&config, ConditionsQuery::Zone(name), &format)?;
        }
        Commands::Active { major_only, format } => {
            answer(&config, ConditionsQuery::Active { major_only }, &format)?;
        }
        Commands::Upcoming { format } => {
            answer(&config, ConditionsQuery::Upcoming, &format)?;
        }
        Commands::Zones => {
            let catalog = Catalog::default();
            for entry in catalog.entries() {
                println!("{}\t{}", entry.name, entry.slug);
            }
        }
        Commands::Mcp => {
            let service = ConditionsService::from_config(&config)?;
            McpServer::new(service).run_stdio()?;
        }
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            // Held here so the blocking HTTP client is dropped outside the runtime.
            let service = Arc::new(ConditionsService::from_config(&config)?);
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("failed to build tokio runtime")?;
            runtime.block_on(rest::serve(&bind, Arc::clone(&service)))?;
        }
        Commands::Harness => {
            if config.fetch.mode == FetchMode::Http {
                warn!("harness fetching the live page; pass --input for a stable fixture");
            }
            let fetcher = Fetcher::from_config(&config.fetch)?;
            let page = fetcher.fetch_page()?;
            if page.kind == BodyKind::Text {
                bail!("harness needs an html page to compare section strategies");
            }
            let report = run_harness(&page.body, &Catalog::default());
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_clean() {
                warn!(
                    agreeing = report.agreeing,
                    zones = report.zones,
                    "section strategies disagree"
                );
            }
        }
    }

    Ok(())
}

fn answer(config: &AppConfig, query: ConditionsQuery, format: &str) -> Result<()> {
    let format: OutputFormat = format.parse()?;
    let service = ConditionsService::from_config(config)?;
    match service.answer(&query, format) {
        Ok(output) => {
            println!("{}", output.to_display_string());
            Ok(())
        }
        Err(err) => report_failure(format, err),
    }
}

// JSON callers get a structured error object on stdout as well as a failing exit.
fn report_failure(format: OutputFormat, err: QueryError) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", json!({ "error": err.to_string() }));
    }
    Err(err.into())
}

fn body_kind_for(path: &Path) -> BodyKind {
    match path.extension().and_then(|s| s.to_str()) {
        Some("txt") => BodyKind::Text,
        _ => BodyKind::Html,
    }
}

// Logs go to stderr; stdout carries results and the MCP channel.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}
