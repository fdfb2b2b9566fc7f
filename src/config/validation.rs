//! Configuration validation
//!
//! Checks that a parsed [`Config`] is internally consistent before any
//! store or network resource is touched.

use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates a configuration, returning the first problem found
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_seed(config)?;
    validate_crawler(config)?;
    validate_filters(config)?;
    validate_http(config)?;
    Ok(())
}

fn validate_seed(config: &Config) -> Result<(), ConfigError> {
    match (&config.seed.base_url, &config.seed.url_list) {
        (None, None) => Err(ConfigError::Validation(
            "seed must set either base-url (crawl) or url-list (download)".to_string(),
        )),
        (Some(_), Some(_)) => Err(ConfigError::Validation(
            "seed.base-url and seed.url-list are mutually exclusive".to_string(),
        )),
        (Some(base), None) => {
            let parsed = Url::parse(base)
                .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", base, e)))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(ConfigError::InvalidUrl(format!(
                    "base-url must be http or https, got {}",
                    parsed.scheme()
                )));
            }
            if parsed.host_str().is_none() {
                return Err(ConfigError::InvalidUrl(format!(
                    "base-url has no host: {}",
                    base
                )));
            }
            Ok(())
        }
        (None, Some(list)) => {
            if list.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "seed.url-list must not be empty".to_string(),
                ));
            }
            Ok(())
        }
    }
}

fn validate_crawler(config: &Config) -> Result<(), ConfigError> {
    let c = &config.crawler;
    if c.max_workers == 0 {
        return Err(ConfigError::Validation(
            "crawler.max-workers must be at least 1".to_string(),
        ));
    }
    if c.max_connections == 0 {
        return Err(ConfigError::Validation(
            "crawler.max-connections must be at least 1".to_string(),
        ));
    }
    if c.stats_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "crawler.stats-interval-secs must be at least 1".to_string(),
        ));
    }
    if c.backup_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "crawler.backup-interval-secs must be at least 1".to_string(),
        ));
    }
    if c.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "crawler.request-timeout-secs must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_filters(config: &Config) -> Result<(), ConfigError> {
    for keyword in config
        .filters
        .exclude
        .iter()
        .chain(config.filters.include.iter())
    {
        if keyword.trim().is_empty() {
            return Err(ConfigError::Validation(
                "filter keywords must not be empty strings".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ConfigError> {
    if config.http.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "http.user-agent must not be empty".to_string(),
        ));
    }
    if let Some(proxy) = &config.http.proxy {
        Url::parse(proxy).map_err(|e| ConfigError::InvalidUrl(format!("proxy {}: {}", proxy, e)))?;
    }
    Ok(())
}
