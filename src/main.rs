//! Trawler main entry point
//!
//! This is the command-line interface for the trawler site crawler.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use trawler::config::load_config_with_hash;
use trawler::crawler::{crawl, store_path};
use trawler::output::{dump_path, dump_urls};
use trawler::store::SqliteStore;
use tracing_subscriber::EnvFilter;

/// Trawler: a persistent, resumable site crawler and downloader
///
/// Trawler walks a site from a base URL (or fetches a list of URLs)
/// with every URL's progress recorded in an on-disk store, so an
/// interrupted run picks up exactly where it left off.
#[derive(Parser, Debug)]
#[command(name = "trawler")]
#[command(version)]
#[command(about = "A persistent, resumable site crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Requeue URLs an interrupted run left in flight before starting
    #[arg(long, conflicts_with = "dump")]
    redo: bool,

    /// Write the reachable URLs of an existing store to a file and exit
    #[arg(long)]
    dump: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = if cli.dump {
        handle_dump(&config)
    } else {
        handle_crawl(&config, cli.redo).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trawler=info,warn"),
            1 => EnvFilter::new("trawler=debug,info"),
            2 => EnvFilter::new("trawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dump mode: exports reachable URLs from an existing store
fn handle_dump(config: &trawler::Config) -> trawler::Result<()> {
    let store_file = store_path(config);
    let store = SqliteStore::new(&store_file)?;

    let path = dump_path(config);
    let count = dump_urls(&store, &path)?;
    println!("{} urls written to {}", count, path.display());
    Ok(())
}

/// Handles the main crawl or download operation
async fn handle_crawl(config: &trawler::Config, redo: bool) -> trawler::Result<()> {
    if config.is_download() {
        tracing::info!("Starting download run for list: {}", config.seed_name());
    } else {
        tracing::info!("Starting crawl of: {}", config.seed_name());
    }

    match crawl(config, redo).await {
        Ok(()) => {
            tracing::info!("Run completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e)
        }
    }
}
