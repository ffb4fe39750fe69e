#![allow(dead_code)]

use async_trait::async_trait;
use jpquote::{
    ExchangeResolver, FinancialsFetcher, MarketDataSource, NamePageSource, NameResolver,
    QuoteError, QuoteSnapshot, ResolveStrategy, ResolvedSymbol, StatementSource, StatementTable,
    StockService,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub fn fixture_path(relative: impl AsRef<Path>) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

pub fn read_fixture(relative: impl AsRef<Path>) -> String {
    fs::read_to_string(fixture_path(relative)).expect("fixture file should be readable")
}

pub fn snapshot(price: f64, previous_close: f64) -> QuoteSnapshot {
    QuoteSnapshot {
        regular_market_price: Some(price),
        previous_close: Some(previous_close),
        exchange: Some("JPX".to_string()),
        long_name: Some("Example Holdings".to_string()),
        ..Default::default()
    }
}

/// Market data keyed by upstream symbol; records every lookup in order.
#[derive(Default)]
pub struct MockMarket {
    snapshots: HashMap<String, QuoteSnapshot>,
    failing: HashSet<String>,
    slow: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
    running: AtomicUsize,
    peak: AtomicUsize,
}

/// Counts a call as running until dropped, including when its future is cancelled.
struct Running<'a>(&'a AtomicUsize);

impl<'a> Running<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Running<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockMarket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, symbol: &str, snapshot: QuoteSnapshot) -> Self {
        self.snapshots.insert(symbol.to_string(), snapshot);
        self
    }

    pub fn with_failure(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.slow.insert(symbol.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of lookups that were in progress at the same time.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for MockMarket {
    async fn lookup(&self, symbol: &ResolvedSymbol) -> jpquote::Result<QuoteSnapshot> {
        let key = symbol.as_str().to_string();
        self.calls.lock().unwrap().push(key.clone());
        let _running = Running::start(&self.running);
        self.peak
            .fetch_max(self.running.load(Ordering::SeqCst), Ordering::SeqCst);

        if let Some(delay) = self.slow.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&key) {
            return Err(QuoteError::InvalidResponse(format!("lookup failed for {}", key)));
        }
        Ok(self.snapshots.get(&key).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MockStatements {
    tables: HashMap<String, StatementTable>,
    fail: bool,
    delay: Option<Duration>,
    running: AtomicUsize,
}

impl MockStatements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, symbol: &str, table: StatementTable) -> Self {
        self.tables.insert(symbol.to_string(), table);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Statement fetches that have started and not yet finished or been cancelled.
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatementSource for MockStatements {
    async fn statement_for(&self, symbol: &ResolvedSymbol) -> jpquote::Result<StatementTable> {
        let _running = Running::start(&self.running);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(QuoteError::NotFound);
        }
        Ok(self.tables.get(symbol.as_str()).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MockPages {
    pages: HashMap<String, String>,
    fail: bool,
    panic: bool,
    delay: Option<Duration>,
}

impl MockPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, symbol: &str, html: impl Into<String>) -> Self {
        self.pages.insert(symbol.to_string(), html.into());
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl NamePageSource for MockPages {
    async fn fetch_page(&self, symbol: &ResolvedSymbol) -> jpquote::Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panic {
            panic!("page source blew up for {}", symbol);
        }
        if self.fail {
            return Err(QuoteError::RateLimitExceeded);
        }
        self.pages
            .get(symbol.as_str())
            .cloned()
            .ok_or(QuoteError::NotFound)
    }
}

pub fn resolver(market: Arc<MockMarket>) -> ExchangeResolver {
    ExchangeResolver::new(market, ResolveStrategy::Exhaustive, Duration::from_secs(1))
}

pub fn name_resolver(pages: Arc<MockPages>) -> NameResolver {
    NameResolver::new(pages, Duration::from_millis(200), Duration::ZERO)
}

pub fn fetcher(statements: Arc<MockStatements>) -> FinancialsFetcher {
    FinancialsFetcher::new(statements, Duration::from_millis(200))
}

pub fn service(
    market: Arc<MockMarket>,
    statements: Arc<MockStatements>,
    pages: Arc<MockPages>,
) -> StockService {
    StockService::new(resolver(market), name_resolver(pages), fetcher(statements))
}
