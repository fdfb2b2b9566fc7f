//! Crawl orchestration
//!
//! Wires the store, the batch engine, and the monitor together for one
//! run. The engine and the monitor race under `select!`: the engine
//! finishing (empty Todo) ends the run cleanly, the monitor returning
//! (tripped breaker) aborts it.

mod breaker;
mod download;
mod engine;
mod extract;
mod fetcher;
mod monitor;
mod processor;

pub use breaker::CircuitBreaker;
pub use download::{extension_for, DownloadSink};
pub use engine::Engine;
pub use extract::extract_hrefs;
pub use fetcher::{build_http_client, fetch_url, FetchOutcome};
pub use monitor::Monitor;
pub use processor::LinkProcessor;

use crate::config::Config;
use crate::store::{SqliteStore, Store};
use crate::{encode_url, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The store file for a config's seed, inside its data directory
///
/// Crawl and download runs of the same seed string get distinct files.
pub fn store_path(config: &Config) -> PathBuf {
    Path::new(&config.output.data_dir).join(format!("{}.db", run_name(config)))
}

/// The checkpoint file the monitor writes next to the store
pub fn backup_path(config: &Config) -> PathBuf {
    Path::new(&config.output.data_dir).join(format!("{}.backup.db", run_name(config)))
}

fn run_name(config: &Config) -> String {
    let suffix = if config.is_download() { "_dl" } else { "_crawl" };
    format!("{}{}", encode_url(config.seed_name()), suffix)
}

/// Runs one crawl or download to completion
///
/// Opens (or resumes) the seed's store, seeds the frontier, and drives
/// the engine with the monitor alongside. With `redo`, URLs stranded in
/// Doing by an interrupted run are requeued first.
pub async fn crawl(config: &Config, redo: bool) -> Result<()> {
    std::fs::create_dir_all(&config.output.data_dir)?;

    let store_file = store_path(config);
    info!(store = %store_file.display(), "opening store");
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(&store_file)?);

    if redo {
        Engine::requeue_doing(store.as_ref())?;
    } else {
        let doing = store.stats()?.doing;
        if doing > 0 {
            tracing::warn!(
                doing,
                "urls left in flight by an earlier run; rerun with --redo to requeue them"
            );
        }
    }

    if let Some(list_path) = &config.seed.url_list {
        Engine::seed_download(store.as_ref(), list_path)?;
    } else if let Some(base_url) = &config.seed.base_url {
        Engine::seed_crawl(store.as_ref(), base_url)?;
    }

    let client = build_http_client(&config.crawler, &config.http)?;
    let fetched = Arc::new(AtomicU64::new(0));

    let engine = if config.is_download() {
        Engine::new_download(config, store.clone(), client, fetched.clone())?
    } else {
        Engine::new_crawl(config, store.clone(), client, fetched.clone())?
    };

    let backup = backup_path(config);
    let monitor = Monitor::new(
        store.clone(),
        fetched,
        Duration::from_secs(config.crawler.stats_interval_secs),
        Duration::from_secs(config.crawler.backup_interval_secs),
        backup.clone(),
        config.crawler.trash_limit,
    );

    let result = tokio::select! {
        result = engine.run() => result,
        result = monitor.run() => result,
    };

    if result.is_ok() {
        // One last snapshot so the backup reflects the finished frontier.
        store.checkpoint(&backup)?;
        let counts = store.stats()?;
        info!(
            done = counts.done,
            trash = counts.trash,
            total = counts.total(),
            "run finished"
        );
    }

    result
}
