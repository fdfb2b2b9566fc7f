//! In-memory frontier backend
//!
//! Holds the whole frontier in a `HashMap` keyed by URL. Nothing survives
//! process exit except explicit checkpoints, which write a tab-separated
//! snapshot. Useful for tests and throwaway crawls of small sites.

use crate::store::traits::{Store, StoreError, StoreResult};
use crate::store::{Partition, PartitionCounts};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// In-memory store backend
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (Partition, u32)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a store from a checkpoint file written by [`Store::checkpoint`]
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut entries = HashMap::new();

        for (lineno, line) in content.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let mut fields = line.splitn(3, '\t');
            let (Some(bucket), Some(tries), Some(url)) =
                (fields.next(), fields.next(), fields.next())
            else {
                return Err(StoreError::Backend(format!(
                    "malformed snapshot line {}",
                    lineno + 1
                )));
            };
            let partition = Partition::from_db_string(bucket).ok_or_else(|| {
                StoreError::Backend(format!("unknown partition in snapshot: {}", bucket))
            })?;
            let tries: u32 = tries.parse().map_err(|_| {
                StoreError::Backend(format!("bad retry count in snapshot line {}", lineno + 1))
            })?;
            entries.insert(url.to_string(), (partition, tries));
        }

        Ok(Self {
            entries: Mutex::new(entries),
        })
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<String, (Partition, u32)>>> {
        self.entries
            .lock()
            .map_err(|e| StoreError::Backend(format!("entries mutex poisoned: {}", e)))
    }
}

impl Store for MemoryStore {
    fn exists(&self, url: &str) -> StoreResult<bool> {
        Ok(self.lock()?.contains_key(url))
    }

    fn find(&self, url: &str) -> StoreResult<Option<(Partition, u32)>> {
        Ok(self.lock()?.get(url).copied())
    }

    fn pop(&self, partition: Partition, n: usize) -> StoreResult<HashMap<String, u32>> {
        let mut entries = self.lock()?;

        let selected: Vec<String> = entries
            .iter()
            .filter(|(_, (p, _))| *p == partition)
            .take(n)
            .map(|(url, _)| url.clone())
            .collect();

        let mut popped = HashMap::with_capacity(selected.len());
        for url in selected {
            if let Some((_, tries)) = entries.remove(&url) {
                popped.insert(url, tries);
            }
        }
        Ok(popped)
    }

    fn post(&self, partition: Partition, new_entries: &HashMap<String, u32>) -> StoreResult<()> {
        let mut entries = self.lock()?;
        for (url, tries) in new_entries {
            entries.insert(url.clone(), (partition, *tries));
        }
        Ok(())
    }

    fn move_urls(&self, src: Partition, dst: Partition, urls: &[String]) -> StoreResult<()> {
        let mut entries = self.lock()?;
        for url in urls {
            if let Some((partition, _)) = entries.get_mut(url) {
                if *partition == src {
                    *partition = dst;
                }
            }
        }
        Ok(())
    }

    fn delete(&self, partition: Partition, url: &str) -> StoreResult<()> {
        let mut entries = self.lock()?;
        if entries.get(url).map(|(p, _)| *p) == Some(partition) {
            entries.remove(url);
        }
        Ok(())
    }

    fn list(&self, partition: Partition) -> StoreResult<Vec<String>> {
        Ok(self
            .lock()?
            .iter()
            .filter(|(_, (p, _))| *p == partition)
            .map(|(url, _)| url.clone())
            .collect())
    }

    fn stats(&self) -> StoreResult<PartitionCounts> {
        let entries = self.lock()?;
        let mut counts = PartitionCounts::default();
        for (partition, _) in entries.values() {
            counts.set(*partition, counts.get(*partition) + 1);
        }
        Ok(counts)
    }

    fn checkpoint(&self, path: &Path) -> StoreResult<()> {
        let tmp_path = path.with_extension("tmp");

        {
            let entries = self.lock()?;
            let mut file = std::fs::File::create(&tmp_path)?;
            for (url, (partition, tries)) in entries.iter() {
                writeln!(file, "{}\t{}\t{}", partition.to_db_string(), tries, url)?;
            }
            file.sync_all()?;
        }

        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}
