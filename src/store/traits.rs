//! Store trait and error types
//!
//! This module defines the trait interface every frontier backend
//! implements, and the associated error type. All implementations must be
//! safe under concurrent invocation from many fetch tasks; serializing
//! internally through a single connection is acceptable, since network
//! fetch latency dominates store latency end to end.

use crate::store::{Partition, PartitionCounts};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during store operations
///
/// Any of these is fatal for the run: if a move cannot be confirmed, the
/// frontier's consistency cannot be guaranteed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for frontier store backends
///
/// Keys are canonical URL strings; values are retry counts. A URL lives in
/// exactly one partition at any settled instant, and implementations must
/// make that invariant unbreakable (the shipped backends key on the URL
/// alone, so two partitions cannot hold the same URL).
pub trait Store: Send + Sync {
    /// Checks whether a URL is known in any partition
    fn exists(&self, url: &str) -> StoreResult<bool>;

    /// Returns the partition and retry count of a URL, if known
    fn find(&self, url: &str) -> StoreResult<Option<(Partition, u32)>>;

    /// Removes and returns up to `n` entries from a partition
    ///
    /// The selection order is arbitrary but exhaustive: repeated pops drain
    /// the partition. It is NOT guaranteed to be FIFO. The removed entries
    /// are handed to the caller, who is responsible for re-inserting them
    /// (normally into Doing).
    fn pop(&self, partition: Partition, n: usize) -> StoreResult<HashMap<String, u32>>;

    /// Bulk upsert into a partition
    ///
    /// Inserts new URLs or overwrites existing ones, relocating them into
    /// `partition` if they were elsewhere.
    fn post(&self, partition: Partition, entries: &HashMap<String, u32>) -> StoreResult<()>;

    /// Atomically relocates a set of URLs from `src` to `dst`, preserving
    /// their stored retry counts. URLs not currently in `src` are left
    /// untouched.
    fn move_urls(&self, src: Partition, dst: Partition, urls: &[String]) -> StoreResult<()>;

    /// Removes a URL from a partition (no-op if absent from it)
    fn delete(&self, partition: Partition, url: &str) -> StoreResult<()>;

    /// Enumerates all URLs in a partition
    fn list(&self, partition: Partition) -> StoreResult<Vec<String>>;

    /// Counts entries per partition
    fn stats(&self) -> StoreResult<PartitionCounts>;

    /// Snapshots the store to `path`
    ///
    /// Writes to a temporary sibling file first, then atomically replaces
    /// `path`, so a crash mid-backup never corrupts the previous good
    /// snapshot.
    fn checkpoint(&self, path: &Path) -> StoreResult<()>;
}
