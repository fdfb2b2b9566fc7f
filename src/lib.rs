//! Trawler: a persistent, resumable site crawler and downloader
//!
//! This crate implements a bounded web crawler built around a durable
//! four-partition URL frontier (Todo, Doing, Done, Trash). Work is fetched
//! in batches by a worker pool, discovered links flow back into the
//! frontier, and the whole crawl can be interrupted and resumed because
//! every URL's state lives in the store.

pub mod config;
pub mod crawler;
pub mod output;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for trawler operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error(
        "Circuit breaker tripped: {trashed} URLs trashed in the last interval (limit {limit})"
    )]
    CircuitBreaker { trashed: u64, limit: u64 },

    #[error("Fetch task panicked: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("URL out of crawl scope: {0}")]
    OutOfScope(String),

    #[error("Normalization produced an empty URL")]
    Empty,
}

/// Result type alias for trawler operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use store::{Partition, PartitionCounts, Store};
pub use url::canonicalize;

/// Encodes a URL (or any string) into the fixed, case-insensitive alphabet
/// used for every store and file name derived from it. Hex over the UTF-8
/// bytes is bijective, so [`decode_url`] recovers the original.
pub fn encode_url(url: &str) -> String {
    hex::encode(url.as_bytes())
}

/// Decodes a name produced by [`encode_url`] back into the original URL.
pub fn decode_url(encoded: &str) -> Option<String> {
    let bytes = hex::decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}
