//! Frontier store: durable four-partition URL bookkeeping
//!
//! Every known URL lives in exactly one of four partitions (Todo, Doing,
//! Done, Trash) together with its retry count. The store is the single
//! source of truth for crawl progress; the engine never keeps a second
//! copy of frontier membership in memory. Backends implement the
//! [`Store`] trait and are interchangeable.

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreError, StoreResult};

/// The four disjoint partitions of the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Discovered but not yet fetched, or requeued after a recoverable failure
    Todo,
    /// Claimed by an in-flight fetch task
    Doing,
    /// Successfully fetched (terminal)
    Done,
    /// Permanently abandoned (terminal)
    Trash,
}

impl Partition {
    /// All partitions, in reporting order
    pub const ALL: [Partition; 4] = [
        Partition::Todo,
        Partition::Doing,
        Partition::Done,
        Partition::Trash,
    ];

    pub fn to_db_string(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
            Self::Trash => "trash",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(Self::Todo),
            "doing" => Some(Self::Doing),
            "done" => Some(Self::Done),
            "trash" => Some(Self::Trash),
            _ => None,
        }
    }

    /// Returns true for partitions a URL never leaves
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Trash)
    }
}

/// Per-partition counts, as returned by [`Store::stats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionCounts {
    pub todo: u64,
    pub doing: u64,
    pub done: u64,
    pub trash: u64,
}

impl PartitionCounts {
    /// Total number of known URLs
    pub fn total(&self) -> u64 {
        self.todo + self.doing + self.done + self.trash
    }

    /// True when no unfinished work remains
    pub fn is_drained(&self) -> bool {
        self.todo == 0 && self.doing == 0
    }

    pub fn get(&self, partition: Partition) -> u64 {
        match partition {
            Partition::Todo => self.todo,
            Partition::Doing => self.doing,
            Partition::Done => self.done,
            Partition::Trash => self.trash,
        }
    }

    pub fn set(&mut self, partition: Partition, count: u64) {
        match partition {
            Partition::Todo => self.todo = count,
            Partition::Doing => self.doing = count,
            Partition::Done => self.done = count,
            Partition::Trash => self.trash = count,
        }
    }
}
