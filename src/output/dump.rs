//! URL dump
//!
//! Writes every URL the crawl considers reachable to a plain text file,
//! one URL per line. Reachable means Todo, Doing, or Done; trashed URLs
//! failed permanently and are left out. The output is sorted so repeated
//! dumps of the same store diff cleanly.

use crate::config::Config;
use crate::store::{Partition, Store};
use crate::{encode_url, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// The dump file for a config's seed, inside its data directory
pub fn dump_path(config: &Config) -> PathBuf {
    Path::new(&config.output.data_dir)
        .join(format!("{}_urls.txt", encode_url(config.seed_name())))
}

/// Dumps the reachable URLs of a store to `path`, returning how many were
/// written
pub fn dump_urls(store: &dyn Store, path: &Path) -> Result<usize> {
    let mut urls = Vec::new();
    for partition in [Partition::Todo, Partition::Doing, Partition::Done] {
        urls.extend(store.list(partition)?);
    }
    urls.sort_unstable();

    let mut file = std::fs::File::create(path)?;
    for url in &urls {
        writeln!(file, "{}", url)?;
    }
    file.sync_all()?;

    info!(count = urls.len(), path = %path.display(), "urls dumped");
    Ok(urls.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::collections::HashMap;

    #[test]
    fn test_dump_excludes_trash() {
        let store = MemoryStore::new();
        for (url, partition) in [
            ("http://example.com/t", Partition::Todo),
            ("http://example.com/g", Partition::Doing),
            ("http://example.com/d", Partition::Done),
            ("http://example.com/x", Partition::Trash),
        ] {
            let mut entries = HashMap::new();
            entries.insert(url.to_string(), 0u32);
            store.post(partition, &entries).unwrap();
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        let count = dump_urls(&store, &path).unwrap();
        assert_eq!(count, 3);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "http://example.com/d\nhttp://example.com/g\nhttp://example.com/t\n"
        );
    }

    #[test]
    fn test_dump_empty_store() {
        let store = MemoryStore::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        assert_eq!(dump_urls(&store, &path).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
