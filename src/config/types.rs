use serde::Deserialize;

/// Main configuration structure for trawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub seed: SeedConfig,
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the crawl starts: either a single base URL to crawl, or a
/// newline-delimited file of URLs to download. Exactly one must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Base URL for crawl mode; also defines the crawl scope
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Path to a newline-delimited URL list for download mode
    #[serde(rename = "url-list")]
    pub url_list: Option<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of concurrent fetch tasks per batch
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: u32,

    /// Size of the HTTP client's connection pool (independent of workers)
    #[serde(rename = "max-connections", default = "default_max_connections")]
    pub max_connections: u32,

    /// Number of non-200 responses tolerated before a URL is trashed
    #[serde(rename = "retry-threshold", default = "default_retry_threshold")]
    pub retry_threshold: u32,

    /// Trashed URLs allowed per stats interval before the breaker trips
    #[serde(rename = "trash-limit", default = "default_trash_limit")]
    pub trash_limit: u64,

    /// Seconds between stats reports and breaker evaluations
    #[serde(rename = "stats-interval-secs", default = "default_stats_interval")]
    pub stats_interval_secs: u64,

    /// Seconds between store checkpoints
    #[serde(rename = "backup-interval-secs", default = "default_backup_interval")]
    pub backup_interval_secs: u64,

    /// Per-request deadline in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Keyword filters applied to canonical URLs (case-insensitive substrings)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    /// Drop any URL containing one of these
    #[serde(default)]
    pub exclude: Vec<String>,

    /// If non-empty, keep only URLs containing at least one of these
    #[serde(default)]
    pub include: Vec<String>,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-agent string sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Optional proxy URL (http://, socks5://) for an alternate dialer
    pub proxy: Option<String>,
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory for the store file, checkpoints, and dumps
    #[serde(rename = "data-dir", default = "default_data_dir")]
    pub data_dir: String,

    /// Directory for downloaded page bodies (download mode)
    #[serde(rename = "download-dir", default = "default_download_dir")]
    pub download_dir: String,
}

fn default_max_workers() -> u32 {
    100
}

fn default_max_connections() -> u32 {
    100
}

fn default_retry_threshold() -> u32 {
    3
}

fn default_trash_limit() -> u64 {
    5
}

fn default_stats_interval() -> u64 {
    5
}

fn default_backup_interval() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("trawler/{}", env!("CARGO_PKG_VERSION"))
}

fn default_data_dir() -> String {
    ".".to_string()
}

fn default_download_dir() -> String {
    "downloaded".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            proxy: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            download_dir: default_download_dir(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            max_connections: default_max_connections(),
            retry_threshold: default_retry_threshold(),
            trash_limit: default_trash_limit(),
            stats_interval_secs: default_stats_interval(),
            backup_interval_secs: default_backup_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    /// Returns true when the config describes a download run rather than a
    /// crawl.
    pub fn is_download(&self) -> bool {
        self.seed.url_list.is_some()
    }

    /// The string all store and dump file names derive from: the base URL
    /// in crawl mode, the URL-list path in download mode.
    pub fn seed_name(&self) -> &str {
        self.seed
            .base_url
            .as_deref()
            .or(self.seed.url_list.as_deref())
            .unwrap_or("")
    }
}
