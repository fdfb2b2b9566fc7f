//! Batch-barrier crawl engine
//!
//! The engine drives the frontier: it pops a batch of Todo URLs, parks
//! them in Doing, fetches every URL of the batch concurrently, and waits
//! for the whole batch to settle before popping the next. The barrier
//! keeps the number of in-flight requests bounded by the batch size and
//! makes Doing an exact record of what a crash would leave behind. An
//! empty pop is the one and only normal termination condition.

use crate::config::Config;
use crate::crawler::download::DownloadSink;
use crate::crawler::extract::extract_hrefs;
use crate::crawler::fetcher::{fetch_url, FetchOutcome};
use crate::crawler::processor::LinkProcessor;
use crate::store::{Partition, Store};
use crate::url::canonicalize_base;
use crate::{Result, TrawlError};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// What happens to a fetched body
enum Mode {
    /// Extract links and grow the frontier
    Crawl(LinkProcessor),
    /// Persist the body to disk
    Download(DownloadSink),
}

struct Inner {
    store: Arc<dyn Store>,
    client: Client,
    mode: Mode,
    max_workers: usize,
    retry_threshold: u32,
    fetched: Arc<AtomicU64>,
}

/// The crawl engine; cheap to clone into fetch tasks
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Inner>,
}

impl Engine {
    /// Builds a crawl-mode engine rooted at the config's base URL
    pub fn new_crawl(
        config: &Config,
        store: Arc<dyn Store>,
        client: Client,
        fetched: Arc<AtomicU64>,
    ) -> Result<Self> {
        let base_url = config
            .seed
            .base_url
            .as_deref()
            .ok_or_else(|| TrawlError::Url(crate::UrlError::Empty))?;
        let base = canonicalize_base(base_url)?;
        let processor = LinkProcessor::new(base, config.filters.clone(), store.clone());

        Ok(Self {
            inner: Arc::new(Inner {
                store,
                client,
                mode: Mode::Crawl(processor),
                max_workers: config.crawler.max_workers as usize,
                retry_threshold: config.crawler.retry_threshold,
                fetched,
            }),
        })
    }

    /// Builds a download-mode engine writing into the config's download
    /// directory
    pub fn new_download(
        config: &Config,
        store: Arc<dyn Store>,
        client: Client,
        fetched: Arc<AtomicU64>,
    ) -> Result<Self> {
        let sink = DownloadSink::open(std::path::Path::new(&config.output.download_dir))?;

        Ok(Self {
            inner: Arc::new(Inner {
                store,
                client,
                mode: Mode::Download(sink),
                max_workers: config.crawler.max_workers as usize,
                retry_threshold: config.crawler.retry_threshold,
                fetched,
            }),
        })
    }

    /// Seeds the frontier for a crawl run
    ///
    /// Posts the canonical base URL to Todo unless the store already knows
    /// it, so resuming a run never re-crawls the seed.
    pub fn seed_crawl(store: &dyn Store, base_url: &str) -> Result<()> {
        let seed = canonicalize_base(base_url)?.to_string();
        if store.exists(&seed)? {
            debug!(url = %seed, "seed already known, resuming");
            return Ok(());
        }

        let mut entries = HashMap::new();
        entries.insert(seed, 0);
        store.post(Partition::Todo, &entries)?;
        Ok(())
    }

    /// Seeds the frontier for a download run from a newline-delimited URL
    /// list
    ///
    /// Blank lines and URLs the store already knows are skipped; everything
    /// else lands in Todo in one post. Returns how many URLs were queued.
    pub fn seed_download(store: &dyn Store, list_path: &str) -> Result<usize> {
        let content = std::fs::read_to_string(list_path)?;

        let mut entries = HashMap::new();
        for line in content.lines() {
            let url = line.trim();
            if url.is_empty() {
                continue;
            }
            if store.exists(url)? {
                continue;
            }
            entries.insert(url.to_string(), 0);
        }

        let count = entries.len();
        if count > 0 {
            store.post(Partition::Todo, &entries)?;
        }
        info!(queued = count, "url list seeded");
        Ok(count)
    }

    /// Moves everything stranded in Doing back to Todo
    ///
    /// A crashed run leaves its last in-flight batch in Doing; this requeues
    /// it so the work is retried instead of lost. Retry counts survive the
    /// move.
    pub fn requeue_doing(store: &dyn Store) -> Result<usize> {
        let stranded = store.list(Partition::Doing)?;
        if !stranded.is_empty() {
            store.move_urls(Partition::Doing, Partition::Todo, &stranded)?;
            info!(requeued = stranded.len(), "stranded urls requeued");
        }
        Ok(stranded.len())
    }

    /// Runs batches until the Todo partition is empty
    pub async fn run(&self) -> Result<()> {
        loop {
            let batch = self.inner.store.pop(Partition::Todo, self.inner.max_workers)?;
            if batch.is_empty() {
                info!("todo partition empty, run complete");
                return Ok(());
            }

            debug!(size = batch.len(), "batch started");
            self.inner.store.post(Partition::Doing, &batch)?;

            let mut tasks = JoinSet::new();
            for (url, tries) in batch {
                let engine = self.clone();
                tasks.spawn(async move { engine.fetch_one(url, tries).await });
            }

            // The barrier: every task of the batch settles before the next
            // pop, and any fatal task error aborts the run.
            while let Some(joined) = tasks.join_next().await {
                joined??;
            }
        }
    }

    /// Fetches one URL and applies the resulting frontier transition
    async fn fetch_one(&self, url: String, tries: u32) -> Result<()> {
        // Reconcile with the store before spending a request. A concurrent
        // requeue or an operator edit may have moved the URL since the pop.
        match self.inner.store.find(&url)? {
            Some((Partition::Doing, _)) => {}
            other => {
                warn!(url = %url, state = ?other, "url left doing, skipping");
                return Ok(());
            }
        }

        let tries = tries + 1;

        // Bodies already on disk from an earlier run cost nothing to finish.
        if let Mode::Download(sink) = &self.inner.mode {
            if sink.already_saved(&url) {
                debug!(url = %url, "already on disk, skipping fetch");
                return self.settle(&url, tries, Partition::Done);
            }
        }

        let outcome = fetch_url(&self.inner.client, &url).await;
        self.inner.fetched.fetch_add(1, Ordering::Relaxed);

        match outcome {
            FetchOutcome::Success { content_type, body } => {
                match &self.inner.mode {
                    Mode::Crawl(processor) => {
                        let text = String::from_utf8_lossy(&body);
                        let queued = processor.process(&extract_hrefs(&text))?;
                        debug!(url = %url, queued, "page crawled");
                    }
                    Mode::Download(sink) => {
                        sink.save(&url, &content_type, &body)?;
                    }
                }
                self.settle(&url, tries, Partition::Done)
            }
            FetchOutcome::HttpFailure { status } => {
                if tries > self.inner.retry_threshold {
                    warn!(url = %url, status, tries, "retries exhausted, trashing");
                    self.settle(&url, tries, Partition::Trash)
                } else {
                    debug!(url = %url, status, tries, "requeued for retry");
                    self.settle(&url, tries, Partition::Todo)
                }
            }
            // No status line means the transport itself is broken for this
            // URL; retrying cannot help within this run.
            FetchOutcome::Transport { error } => {
                warn!(url = %url, error = %error, "transport failure, trashing");
                self.settle(&url, tries, Partition::Trash)
            }
        }
    }

    /// Relocates a URL out of Doing with its updated retry count
    fn settle(&self, url: &str, tries: u32, partition: Partition) -> Result<()> {
        let mut entry = HashMap::new();
        entry.insert(url.to_string(), tries);
        self.inner.store.post(partition, &entry)?;
        Ok(())
    }
}
