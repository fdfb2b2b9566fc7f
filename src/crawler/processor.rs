//! Link processor
//!
//! Turns the raw hrefs of one fetched page into new Todo entries. The
//! pipeline per link: canonicalize against the crawl base, apply the
//! exclude and include keyword filters, drop anything the store already
//! knows, then post all survivors to Todo in a single bulk write.

use crate::config::FilterConfig;
use crate::store::{Partition, Store};
use crate::url::canonicalize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Filters and enqueues discovered links
pub struct LinkProcessor {
    base: Url,
    filters: FilterConfig,
    store: Arc<dyn Store>,
}

impl LinkProcessor {
    pub fn new(base: Url, filters: FilterConfig, store: Arc<dyn Store>) -> Self {
        Self {
            base,
            filters,
            store,
        }
    }

    /// Processes the links of one page and returns how many new URLs were
    /// queued
    ///
    /// Duplicates within the page collapse before the store is consulted,
    /// and all accepted links go to the store in one post.
    pub fn process(&self, raw_links: &[String]) -> crate::Result<usize> {
        let mut accepted: HashMap<String, u32> = HashMap::new();

        for raw in raw_links {
            let url = match canonicalize(raw, &self.base) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    debug!(link = %raw, reason = %e, "link rejected");
                    continue;
                }
            };

            if !self.passes_filters(&url) {
                debug!(url = %url, "link filtered");
                continue;
            }

            if accepted.contains_key(&url) {
                continue;
            }

            if self.store.exists(&url)? {
                continue;
            }

            accepted.insert(url, 0);
        }

        let count = accepted.len();
        if count > 0 {
            self.store.post(Partition::Todo, &accepted)?;
        }
        Ok(count)
    }

    /// Applies the keyword filters to a canonical URL
    ///
    /// Exclude wins over include: a URL matching both is dropped. An empty
    /// include list accepts everything not excluded.
    fn passes_filters(&self, url: &str) -> bool {
        let lowered = url.to_ascii_lowercase();

        for keyword in &self.filters.exclude {
            if lowered.contains(&keyword.to_ascii_lowercase()) {
                return false;
            }
        }

        if self.filters.include.is_empty() {
            return true;
        }

        self.filters
            .include
            .iter()
            .any(|keyword| lowered.contains(&keyword.to_ascii_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn processor(filters: FilterConfig, store: Arc<dyn Store>) -> LinkProcessor {
        let base = Url::parse("http://example.com/").unwrap();
        LinkProcessor::new(base, filters, store)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_in_scope_links_queued() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let p = processor(FilterConfig::default(), store.clone());

        let queued = p
            .process(&strings(&["/a", "/b?x=1", "http://other.com/c", "/a"]))
            .unwrap();
        assert_eq!(queued, 2);

        assert!(store.exists("http://example.com/a").unwrap());
        assert!(store.exists("http://example.com/b").unwrap());
        assert!(!store.exists("http://other.com/c").unwrap());
    }

    #[test]
    fn test_known_urls_not_requeued() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut done = HashMap::new();
        done.insert("http://example.com/a".to_string(), 0u32);
        store.post(Partition::Done, &done).unwrap();

        let p = processor(FilterConfig::default(), store.clone());
        let queued = p.process(&strings(&["/a", "/b"])).unwrap();
        assert_eq!(queued, 1);

        // The finished URL stayed in Done.
        assert_eq!(
            store.find("http://example.com/a").unwrap(),
            Some((Partition::Done, 0))
        );
    }

    #[test]
    fn test_exclude_filter() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let filters = FilterConfig {
            exclude: vec!["logout".to_string()],
            include: vec![],
        };
        let p = processor(filters, store.clone());

        let queued = p.process(&strings(&["/account/LOGOUT", "/account"])).unwrap();
        assert_eq!(queued, 1);
        assert!(store.exists("http://example.com/account").unwrap());
    }

    #[test]
    fn test_include_filter() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let filters = FilterConfig {
            exclude: vec![],
            include: vec!["blog".to_string()],
        };
        let p = processor(filters, store.clone());

        let queued = p.process(&strings(&["/blog/post-1", "/about"])).unwrap();
        assert_eq!(queued, 1);
        assert!(store.exists("http://example.com/blog/post-1").unwrap());
    }

    #[test]
    fn test_exclude_beats_include() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let filters = FilterConfig {
            exclude: vec!["draft".to_string()],
            include: vec!["blog".to_string()],
        };
        let p = processor(filters, store);

        let queued = p.process(&strings(&["/blog/draft-1"])).unwrap();
        assert_eq!(queued, 0);
    }

    #[test]
    fn test_empty_page() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let p = processor(FilterConfig::default(), store);
        assert_eq!(p.process(&[]).unwrap(), 0);
    }
}
