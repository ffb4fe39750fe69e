use std::time::Duration;

use super::error::{QuoteError, Result};
use super::options::{BatchOptions, ResolveStrategy};

/// Configuration for the quote client and the services built on top of it
#[derive(Debug, Clone)]
pub struct QuoteConfig {
    /// User agent string for HTTP requests
    pub user_agent: String,
    /// Rate limit in requests per second, shared by every upstream call
    pub rate_limit: u32,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Upper bound for a single exchange candidate lookup. A full miss costs
    /// this times the number of candidates and must fit in the batch item timeout.
    pub lookup_timeout: Duration,
    /// Upper bound for the localized name scrape
    pub name_timeout: Duration,
    /// Maximum random delay applied before the name page request
    pub name_jitter: Duration,
    /// Upper bound for the financial statement fetch
    pub financials_timeout: Duration,
    /// Which exchange suffixes are tried
    pub strategy: ResolveStrategy,
    /// Batch limits and per-item timeout
    pub batch: BatchOptions,
    /// Number of concurrent batch workers
    pub workers: usize,
    /// Base URLs for the upstream sources
    pub base_urls: QuoteUrls,
}

/// Base URLs for the upstream sources
#[derive(Debug, Clone)]
pub struct QuoteUrls {
    /// Quote summary endpoint, the symbol is appended as a path segment
    pub quote_summary: String,
    /// Page holding the localized company name, the symbol is appended as a path segment
    pub name_page: String,
}

impl Default for QuoteUrls {
    fn default() -> Self {
        Self {
            quote_summary: "https://query2.finance.yahoo.com/v10/finance/quoteSummary".to_string(),
            name_page: "https://finance.yahoo.co.jp/quote".to_string(),
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            rate_limit: 10,
            timeout: Duration::from_secs(10),
            lookup_timeout: Duration::from_secs(5),
            name_timeout: Duration::from_secs(5),
            name_jitter: Duration::from_millis(300),
            financials_timeout: Duration::from_secs(10),
            strategy: ResolveStrategy::Exhaustive,
            batch: BatchOptions::default(),
            workers: 5,
            base_urls: QuoteUrls::default(),
        }
    }
}

impl QuoteConfig {
    /// Builds a configuration from `JPQUOTE_*` environment variables, falling
    /// back to the defaults for anything unset.
    ///
    /// | Variable | Meaning |
    /// |---|---|
    /// | `JPQUOTE_USER_AGENT` | user agent header |
    /// | `JPQUOTE_RATE_LIMIT` | requests per second |
    /// | `JPQUOTE_TIMEOUT_SECS` | HTTP timeout |
    /// | `JPQUOTE_LOOKUP_TIMEOUT_SECS` | per-candidate lookup timeout |
    /// | `JPQUOTE_NAME_TIMEOUT_SECS` | name scrape timeout |
    /// | `JPQUOTE_NAME_JITTER_MS` | max delay before the name scrape |
    /// | `JPQUOTE_FINANCIALS_TIMEOUT_SECS` | statement fetch timeout |
    /// | `JPQUOTE_BATCH_TIMEOUT_SECS` | per-item batch timeout |
    /// | `JPQUOTE_MAX_BATCH_SIZE` | batch size limit |
    /// | `JPQUOTE_WORKERS` | concurrent batch workers |
    /// | `JPQUOTE_STRATEGY` | `exhaustive` or `primary` |
    /// | `JPQUOTE_QUOTE_SUMMARY_URL` | quote summary base URL |
    /// | `JPQUOTE_NAME_PAGE_URL` | name page base URL |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`QuoteConfig::from_env`] but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(agent) = lookup("JPQUOTE_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(rate) = parse_var::<u32, _>(&lookup, "JPQUOTE_RATE_LIMIT")? {
            config.rate_limit = rate;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "JPQUOTE_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "JPQUOTE_LOOKUP_TIMEOUT_SECS")? {
            config.lookup_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "JPQUOTE_NAME_TIMEOUT_SECS")? {
            config.name_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "JPQUOTE_NAME_JITTER_MS")? {
            config.name_jitter = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "JPQUOTE_FINANCIALS_TIMEOUT_SECS")? {
            config.financials_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "JPQUOTE_BATCH_TIMEOUT_SECS")? {
            config.batch = config.batch.with_item_timeout(Duration::from_secs(secs));
        }
        if let Some(max) = parse_var::<usize, _>(&lookup, "JPQUOTE_MAX_BATCH_SIZE")? {
            config.batch = config.batch.with_max_size(max);
        }
        if let Some(workers) = parse_var::<usize, _>(&lookup, "JPQUOTE_WORKERS")? {
            config.workers = workers;
        }
        if let Some(strategy) = lookup("JPQUOTE_STRATEGY") {
            config.strategy = strategy.parse()?;
        }
        if let Some(url) = lookup("JPQUOTE_QUOTE_SUMMARY_URL") {
            config.base_urls.quote_summary = url;
        }
        if let Some(url) = lookup("JPQUOTE_NAME_PAGE_URL") {
            config.base_urls.name_page = url;
        }

        if config.workers == 0 {
            return Err(QuoteError::ConfigError(
                "Worker count must be greater than zero".to_string(),
            ));
        }
        if config.batch.max_size == 0 {
            return Err(QuoteError::ConfigError(
                "Batch size limit must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| QuoteError::ConfigError(format!("Invalid value for {}: {}", key, e))),
        None => Ok(None),
    }
}
