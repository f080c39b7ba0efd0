//! `pricehound` command-line interface.
//!
//! Results go to stdout (a table, or JSON with `--json`). All tracing output
//! goes to stderr so that stdout stays machine-readable.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use price_search::Currency;
use pricehound::{HoundConfig, SearchOverrides, report};

#[derive(Parser)]
#[command(
    name = "pricehound",
    about = "Find the cheapest landed price for a product across many catalogs",
    version
)]
struct Cli {
    /// Configuration file (default: ~/.config/pricehound/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every configured catalog for a product
    Search {
        /// Product to look for, e.g. "Samsung S25 Ultra"
        query: String,
        /// Attempts per catalog, including the first
        #[arg(long)]
        max_attempts: Option<u32>,
        /// Deadline for the whole search in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Currency for estimated prices (ILS, USD, EUR, GBP)
        #[arg(long)]
        currency: Option<Currency>,
    },
    /// List the configured catalogs and their shipping terms
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "pricehound=debug,price_search=debug"
    } else {
        "pricehound=info,price_search=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let config = HoundConfig::load(cli.config.as_deref()).context("failed to load config")?;

    match cli.command {
        Commands::Search {
            query,
            max_attempts,
            timeout_ms,
            currency,
        } => {
            let overrides = SearchOverrides {
                max_attempts,
                timeout_ms,
                currency,
            };
            let response = pricehound::run_search(&config, &query, &overrides)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "search rejected");
                    anyhow::anyhow!("search failed: {e}")
                })?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print!("{}", report::render_table(&response));
            }
        }
        Commands::Sources => {
            let quotes = pricehound::source_quotes(&config)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&quotes)?);
            } else {
                print!("{}", report::render_sources(&quotes));
            }
        }
    }

    Ok(())
}
