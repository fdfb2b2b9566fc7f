//! HTTP fetcher
//!
//! Builds the shared HTTP client and classifies the outcome of each
//! request. Every fetch lands in exactly one of three outcome classes:
//! success (HTTP 200), an HTTP failure (any other status), or a transport
//! error (the request never produced a status line at all). The engine
//! maps each class to a frontier transition.

use crate::config::{CrawlerConfig, HttpConfig};
use reqwest::{Client, Proxy};
use std::time::Duration;

/// Outcome of a single fetch, classified for the frontier
#[derive(Debug)]
pub enum FetchOutcome {
    /// HTTP 200 with the body read to completion
    Success {
        /// Content-Type header value, empty if absent
        content_type: String,
        /// Raw response body
        body: Vec<u8>,
    },

    /// Any response status other than 200
    HttpFailure {
        /// The HTTP status code
        status: u16,
    },

    /// The request failed below HTTP: DNS, connect, TLS, timeout, or a
    /// body read that broke off
    Transport {
        /// Error description
        error: String,
    },
}

/// Builds the HTTP client shared by all fetch tasks
///
/// # Arguments
///
/// * `crawler` - Timeouts and connection pool sizing
/// * `http` - User agent and optional proxy dialer
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client (bad proxy URL)
pub fn build_http_client(
    crawler: &CrawlerConfig,
    http: &HttpConfig,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(&http.user_agent)
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(crawler.max_connections as usize)
        .gzip(true)
        .brotli(true);

    // An http:// or socks5:// proxy replaces the direct dialer for every
    // request, which is how Tor-routed runs are configured.
    if let Some(proxy_url) = &http.proxy {
        builder = builder.proxy(Proxy::all(proxy_url)?);
    }

    builder.build()
}

/// Fetches a URL and classifies the result
///
/// The body is read eagerly on success so the outcome is self-contained; a
/// body read that fails mid-stream counts as a transport error, not a
/// success.
pub async fn fetch_url(client: &Client, url: &str) -> FetchOutcome {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchOutcome::Transport {
                error: e.to_string(),
            }
        }
    };

    let status = response.status();
    if status.as_u16() != 200 {
        return FetchOutcome::HttpFailure {
            status: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.bytes().await {
        Ok(body) => FetchOutcome::Success {
            content_type,
            body: body.to_vec(),
        },
        Err(e) => FetchOutcome::Transport {
            error: e.to_string(),
        },
    }
}
