//! Stats and checkpoint scheduler
//!
//! An independent task that periodically reports frontier counts and
//! throughput, evaluates the circuit breaker, and checkpoints the store.
//! The monitor never decides that the crawl is finished: the engine's
//! empty batch is the authoritative terminator, and a momentarily drained
//! frontier seen here can be mid-relocation between partitions. The loop
//! only ever returns to report a tripped breaker.

use crate::crawler::breaker::CircuitBreaker;
use crate::store::Store;
use crate::{Result, TrawlError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Periodic stats reporter, breaker evaluator, and checkpointer
pub struct Monitor {
    store: Arc<dyn Store>,
    /// Pages fetched since the run started, incremented by fetch tasks
    fetched: Arc<AtomicU64>,
    stats_interval: Duration,
    backup_interval: Duration,
    backup_path: PathBuf,
    trash_limit: u64,
}

impl Monitor {
    pub fn new(
        store: Arc<dyn Store>,
        fetched: Arc<AtomicU64>,
        stats_interval: Duration,
        backup_interval: Duration,
        backup_path: PathBuf,
        trash_limit: u64,
    ) -> Self {
        Self {
            store,
            fetched,
            stats_interval,
            backup_interval,
            backup_path,
            trash_limit,
        }
    }

    /// Runs until the breaker trips or a store error surfaces
    pub async fn run(self) -> Result<()> {
        let initial_trash = self.store.stats()?.trash;
        let mut breaker = CircuitBreaker::new(self.trash_limit, initial_trash);

        let mut stats_tick = tokio::time::interval(self.stats_interval);
        let mut backup_tick = tokio::time::interval(self.backup_interval);
        // The first tick of an interval fires immediately; skip it so the
        // first report covers a full interval.
        stats_tick.tick().await;
        backup_tick.tick().await;

        let mut last_fetched = self.fetched.load(Ordering::Relaxed);

        loop {
            tokio::select! {
                _ = stats_tick.tick() => {
                    let counts = self.store.stats()?;

                    let fetched_now = self.fetched.load(Ordering::Relaxed);
                    let rate = (fetched_now - last_fetched) as f64
                        / self.stats_interval.as_secs_f64();
                    last_fetched = fetched_now;

                    info!(
                        todo = counts.todo,
                        doing = counts.doing,
                        done = counts.done,
                        trash = counts.trash,
                        rate = format!("{:.1}/s", rate),
                        "frontier"
                    );

                    // Informational only. The engine's empty pop decides
                    // when the run actually ends; a drained snapshot here
                    // can be a batch mid-relocation.
                    if counts.is_drained() {
                        info!("frontier drained");
                    }

                    if let Some(trashed) = breaker.observe(counts.trash) {
                        error!(
                            trashed,
                            limit = breaker.limit(),
                            "circuit breaker tripped, aborting run"
                        );
                        return Err(TrawlError::CircuitBreaker {
                            trashed,
                            limit: breaker.limit(),
                        });
                    }
                }
                _ = backup_tick.tick() => {
                    match self.store.checkpoint(&self.backup_path) {
                        Ok(()) => info!(path = %self.backup_path.display(), "store checkpointed"),
                        // A failed checkpoint loses durability, not
                        // correctness; keep crawling and retry next tick.
                        Err(e) => warn!(error = %e, "checkpoint failed"),
                    }
                }
            }
        }
    }
}
