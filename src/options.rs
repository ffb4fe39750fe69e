use std::str::FromStr;
use std::time::Duration;

use super::error::QuoteError;
use super::symbol::ExchangeSuffix;

/// Which exchange suffixes the resolver tries for a raw code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveStrategy {
    /// Tokyo, Nagoya, Fukuoka, Sapporo, in that order
    #[default]
    Exhaustive,
    /// Tokyo only
    PrimaryOnly,
}

impl ResolveStrategy {
    pub fn candidates(&self) -> &'static [ExchangeSuffix] {
        match self {
            ResolveStrategy::Exhaustive => &ExchangeSuffix::ALL,
            ResolveStrategy::PrimaryOnly => &[ExchangeSuffix::Tokyo],
        }
    }
}

impl FromStr for ResolveStrategy {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exhaustive" | "all" => Ok(ResolveStrategy::Exhaustive),
            "primary" | "primary-only" | "fast" => Ok(ResolveStrategy::PrimaryOnly),
            other => Err(QuoteError::ConfigError(format!(
                "Unknown resolve strategy: {}",
                other
            ))),
        }
    }
}

/// Options for batch requests
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Largest accepted number of codes per batch
    pub max_size: usize,
    /// Time allowed for one code once its worker has started
    pub item_timeout: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_size: 20,
            item_timeout: Duration::from_secs(30),
        }
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_item_timeout(mut self, item_timeout: Duration) -> Self {
        self.item_timeout = item_timeout;
        self
    }
}
