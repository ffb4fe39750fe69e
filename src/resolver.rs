//! Exchange suffix resolution.
//!
//! A raw code is paired with each candidate suffix in priority order until
//! the market data source returns a snapshot carrying a usable price. Lookup
//! failures of any kind only move on to the next candidate; the caller sees a
//! single [`QuoteError::TickerNotFound`] once every candidate is exhausted.

use std::sync::Arc;
use std::time::Duration;

use super::error::{QuoteError, Result};
use super::options::ResolveStrategy;
use super::snapshot::QuoteSnapshot;
use super::symbol::{ExchangeSuffix, ResolvedSymbol, TickerCode};
use super::traits::MarketDataSource;

#[derive(Clone)]
pub struct ExchangeResolver {
    source: Arc<dyn MarketDataSource>,
    candidates: Vec<ExchangeSuffix>,
    lookup_timeout: Duration,
}

impl ExchangeResolver {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        strategy: ResolveStrategy,
        lookup_timeout: Duration,
    ) -> Self {
        Self::with_candidates(source, strategy.candidates().to_vec(), lookup_timeout)
    }

    /// Uses an explicit candidate order instead of a [`ResolveStrategy`].
    pub fn with_candidates(
        source: Arc<dyn MarketDataSource>,
        candidates: Vec<ExchangeSuffix>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            source,
            candidates,
            lookup_timeout,
        }
    }

    pub fn candidates(&self) -> &[ExchangeSuffix] {
        &self.candidates
    }

    /// Returns the first candidate whose snapshot is non-empty and has a price.
    ///
    /// # Errors
    ///
    /// `QuoteError::TickerNotFound` carrying the original code when no
    /// candidate produced a valid snapshot.
    pub async fn resolve(&self, code: &TickerCode) -> Result<(ResolvedSymbol, QuoteSnapshot)> {
        for suffix in &self.candidates {
            let symbol = ResolvedSymbol::new(code.clone(), *suffix);
            tracing::debug!("Looking up {}", symbol);

            let lookup = tokio::time::timeout(self.lookup_timeout, self.source.lookup(&symbol));
            match lookup.await {
                Ok(Ok(snapshot)) if snapshot.is_valid() => {
                    tracing::info!("Resolved {} as {}", code, symbol);
                    return Ok((symbol, snapshot));
                }
                Ok(Ok(_)) => {
                    tracing::debug!("No usable quote for {}", symbol);
                }
                Ok(Err(e)) => {
                    tracing::debug!("Lookup for {} failed: {}", symbol, e);
                }
                Err(_) => {
                    tracing::warn!(
                        "Lookup for {} timed out after {:?}",
                        symbol,
                        self.lookup_timeout
                    );
                }
            }
        }

        Err(QuoteError::TickerNotFound {
            code: code.to_string(),
        })
    }
}

impl std::fmt::Debug for ExchangeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeResolver")
            .field("candidates", &self.candidates)
            .field("lookup_timeout", &self.lookup_timeout)
            .finish_non_exhaustive()
    }
}
