//! Trait definitions for the upstream sources the pipeline reads from.
//!
//! The resolver, name lookup and statement fetch each depend on exactly one
//! of these traits rather than on the HTTP client, so they can be driven by
//! in-memory sources in tests. [`QuoteClient`](crate::QuoteClient) implements
//! all three against the real endpoints.

use super::error::Result;
use super::snapshot::{QuoteSnapshot, StatementTable};
use super::symbol::ResolvedSymbol;
use async_trait::async_trait;

/// Source of quote snapshots keyed by upstream symbol.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Looks up the snapshot for a code+suffix candidate. An unknown symbol
    /// may either fail or return an empty snapshot.
    async fn lookup(&self, symbol: &ResolvedSymbol) -> Result<QuoteSnapshot>;
}

/// Source of income statement tables.
#[async_trait]
pub trait StatementSource: Send + Sync {
    /// Retrieves the statement table for a resolved symbol, possibly empty.
    async fn statement_for(&self, symbol: &ResolvedSymbol) -> Result<StatementTable>;
}

/// Source of the page that carries the localized company name.
#[async_trait]
pub trait NamePageSource: Send + Sync {
    /// Fetches raw page markup for a resolved symbol.
    async fn fetch_page(&self, symbol: &ResolvedSymbol) -> Result<String>;
}
