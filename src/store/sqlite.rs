//! SQLite frontier backend
//!
//! A single `urls` table with the URL as primary key holds the whole
//! frontier; the `bucket` column names the partition. The primary key
//! makes the one-partition-per-URL invariant structural rather than
//! convention. A `Mutex` around the connection serializes access, which
//! satisfies the concurrency contract without a pool.

use crate::store::traits::{Store, StoreError, StoreResult};
use crate::store::{Partition, PartitionCounts};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS urls (
    url TEXT PRIMARY KEY,
    bucket TEXT NOT NULL,
    tries INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_urls_bucket ON urls(bucket);
"#;

/// SQLite store backend
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates a store at the given path
    pub fn new(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory store (used by tests and ephemeral runs)
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Backend(format!("connection mutex poisoned: {}", e)))
    }
}

impl Store for SqliteStore {
    fn exists(&self, url: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM urls WHERE url = ?1", params![url], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn find(&self, url: &str) -> StoreResult<Option<(Partition, u32)>> {
        let conn = self.lock()?;
        let row: Option<(String, u32)> = conn
            .query_row(
                "SELECT bucket, tries FROM urls WHERE url = ?1",
                params![url],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((bucket, tries)) => {
                let partition = Partition::from_db_string(&bucket).ok_or_else(|| {
                    StoreError::Backend(format!("unknown partition in store: {}", bucket))
                })?;
                Ok(Some((partition, tries)))
            }
            None => Ok(None),
        }
    }

    fn pop(&self, partition: Partition, n: usize) -> StoreResult<HashMap<String, u32>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut entries = HashMap::new();
        {
            let mut stmt = tx.prepare("SELECT url, tries FROM urls WHERE bucket = ?1 LIMIT ?2")?;
            let rows = stmt.query_map(params![partition.to_db_string(), n as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
            })?;
            for row in rows {
                let (url, tries) = row?;
                entries.insert(url, tries);
            }
        }
        {
            let mut stmt = tx.prepare("DELETE FROM urls WHERE url = ?1")?;
            for url in entries.keys() {
                stmt.execute(params![url])?;
            }
        }

        tx.commit()?;
        Ok(entries)
    }

    fn post(&self, partition: Partition, entries: &HashMap<String, u32>) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO urls (url, bucket, tries) VALUES (?1, ?2, ?3)
                 ON CONFLICT(url) DO UPDATE SET bucket = excluded.bucket, tries = excluded.tries",
            )?;
            for (url, tries) in entries {
                stmt.execute(params![url, partition.to_db_string(), tries])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn move_urls(&self, src: Partition, dst: Partition, urls: &[String]) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("UPDATE urls SET bucket = ?1 WHERE url = ?2 AND bucket = ?3")?;
            for url in urls {
                stmt.execute(params![dst.to_db_string(), url, src.to_db_string()])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn delete(&self, partition: Partition, url: &str) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM urls WHERE url = ?1 AND bucket = ?2",
            params![url, partition.to_db_string()],
        )?;
        Ok(())
    }

    fn list(&self, partition: Partition) -> StoreResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT url FROM urls WHERE bucket = ?1")?;
        let urls = stmt
            .query_map(params![partition.to_db_string()], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(urls)
    }

    fn stats(&self) -> StoreResult<PartitionCounts> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT bucket, COUNT(*) FROM urls GROUP BY bucket")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = PartitionCounts::default();
        for row in rows {
            let (bucket, count) = row?;
            if let Some(partition) = Partition::from_db_string(&bucket) {
                counts.set(partition, count as u64);
            }
        }
        Ok(counts)
    }

    fn checkpoint(&self, path: &Path) -> StoreResult<()> {
        let tmp_path = path.with_extension("tmp");
        if tmp_path.exists() {
            std::fs::remove_file(&tmp_path)?;
        }

        {
            let conn = self.lock()?;
            // VACUUM INTO produces a consistent single-file snapshot without
            // blocking other readers of the WAL.
            conn.execute("VACUUM INTO ?1", params![tmp_path.to_string_lossy()])?;
        }

        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_in_memory() {
        assert!(SqliteStore::new_in_memory().is_ok());
    }

    #[test]
    fn test_post_and_find() {
        let store = SqliteStore::new_in_memory().unwrap();
        let mut entries = HashMap::new();
        entries.insert("http://example.com/".to_string(), 0u32);
        store.post(Partition::Todo, &entries).unwrap();

        assert_eq!(
            store.find("http://example.com/").unwrap(),
            Some((Partition::Todo, 0))
        );
        assert!(store.exists("http://example.com/").unwrap());
        assert!(!store.exists("http://example.com/a").unwrap());
    }

    #[test]
    fn test_post_relocates_between_partitions() {
        let store = SqliteStore::new_in_memory().unwrap();
        let mut entries = HashMap::new();
        entries.insert("http://example.com/a".to_string(), 1u32);
        store.post(Partition::Todo, &entries).unwrap();

        // Re-posting to another partition moves the row, it cannot fork.
        entries.insert("http://example.com/a".to_string(), 2u32);
        store.post(Partition::Trash, &entries).unwrap();

        assert_eq!(
            store.find("http://example.com/a").unwrap(),
            Some((Partition::Trash, 2))
        );
        let counts = store.stats().unwrap();
        assert_eq!(counts.todo, 0);
        assert_eq!(counts.trash, 1);
        assert_eq!(counts.total(), 1);
    }

    #[test]
    fn test_pop_bounded_and_removing() {
        let store = SqliteStore::new_in_memory().unwrap();
        let mut entries = HashMap::new();
        for i in 0..10 {
            entries.insert(format!("http://example.com/{}", i), 0u32);
        }
        store.post(Partition::Todo, &entries).unwrap();

        let batch = store.pop(Partition::Todo, 4).unwrap();
        assert_eq!(batch.len(), 4);
        assert_eq!(store.stats().unwrap().todo, 6);

        // Popped entries really left the store.
        for url in batch.keys() {
            assert!(!store.exists(url).unwrap());
        }
    }

    #[test]
    fn test_pop_exhaustive() {
        let store = SqliteStore::new_in_memory().unwrap();
        let mut entries = HashMap::new();
        for i in 0..7 {
            entries.insert(format!("http://example.com/{}", i), 0u32);
        }
        store.post(Partition::Todo, &entries).unwrap();

        let mut seen = std::collections::HashSet::new();
        loop {
            let batch = store.pop(Partition::Todo, 3).unwrap();
            if batch.is_empty() {
                break;
            }
            for url in batch.into_keys() {
                assert!(seen.insert(url));
            }
        }
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn test_move_preserves_tries() {
        let store = SqliteStore::new_in_memory().unwrap();
        let mut entries = HashMap::new();
        entries.insert("http://example.com/a".to_string(), 3u32);
        store.post(Partition::Doing, &entries).unwrap();

        store
            .move_urls(
                Partition::Doing,
                Partition::Done,
                &["http://example.com/a".to_string()],
            )
            .unwrap();

        assert_eq!(
            store.find("http://example.com/a").unwrap(),
            Some((Partition::Done, 3))
        );
    }

    #[test]
    fn test_move_ignores_urls_not_in_src() {
        let store = SqliteStore::new_in_memory().unwrap();
        let mut entries = HashMap::new();
        entries.insert("http://example.com/a".to_string(), 0u32);
        store.post(Partition::Done, &entries).unwrap();

        store
            .move_urls(
                Partition::Doing,
                Partition::Todo,
                &["http://example.com/a".to_string()],
            )
            .unwrap();

        assert_eq!(
            store.find("http://example.com/a").unwrap(),
            Some((Partition::Done, 0))
        );
    }

    #[test]
    fn test_delete_scoped_to_partition() {
        let store = SqliteStore::new_in_memory().unwrap();
        let mut entries = HashMap::new();
        entries.insert("http://example.com/a".to_string(), 0u32);
        store.post(Partition::Todo, &entries).unwrap();

        store.delete(Partition::Done, "http://example.com/a").unwrap();
        assert!(store.exists("http://example.com/a").unwrap());

        store.delete(Partition::Todo, "http://example.com/a").unwrap();
        assert!(!store.exists("http://example.com/a").unwrap());
    }

    #[test]
    fn test_checkpoint_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(&dir.path().join("frontier.db")).unwrap();

        let mut entries = HashMap::new();
        entries.insert("http://example.com/".to_string(), 0u32);
        store.post(Partition::Done, &entries).unwrap();

        let backup = dir.path().join("frontier.backup.db");
        store.checkpoint(&backup).unwrap();
        assert!(backup.exists());

        // A snapshot must itself be a readable store.
        let restored = SqliteStore::new(&backup).unwrap();
        assert_eq!(restored.stats().unwrap().done, 1);

        // Replacing the snapshot keeps the newest state.
        entries.insert("http://example.com/a".to_string(), 0u32);
        store.post(Partition::Done, &entries).unwrap();
        store.checkpoint(&backup).unwrap();
        let restored = SqliteStore::new(&backup).unwrap();
        assert_eq!(restored.stats().unwrap().done, 2);
    }
}
