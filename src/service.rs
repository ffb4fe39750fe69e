//! Single-quote aggregation.
//!
//! ```text
//! code ──► ExchangeResolver ──► (symbol, snapshot)
//!                                   │
//!                     ┌─────────────┴─────────────┐
//!                     ▼                           ▼
//!               NameResolver              FinancialsFetcher
//!                     └─────────────┬─────────────┘
//!                                   ▼
//!                         format ──► NormalizedRecord
//! ```
//!
//! The two middle branches run as separate tasks and are both awaited before
//! formatting. Neither can fail the request; a panic in either is treated the
//! same as a soft failure. Dropping the request future aborts both branches.

use serde::Serialize;
use std::sync::Arc;

use super::config::QuoteConfig;
use super::core::QuoteClient;
use super::error::Result;
use super::financials::FinancialsFetcher;
use super::format::{self, PLACEHOLDER, PassThrough};
use super::names::NameResolver;
use super::pool::AbortOnDrop;
use super::resolver::ExchangeResolver;
use super::snapshot::{QuoteSnapshot, StatementFigures};
use super::symbol::TickerCode;

/// Final, display-ready record for one ticker code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    #[serde(rename = "companyName")]
    pub company_name: String,
    pub code: String,
    pub market: String,
    pub price: String,
    pub change: f64,
    #[serde(rename = "changePercent")]
    pub change_percent: f64,
    #[serde(rename = "marketCap")]
    pub market_cap: String,
    #[serde(rename = "pretaxIncome")]
    pub pretax_income: String,
    #[serde(rename = "netIncome")]
    pub net_income: String,
    pub sales_latest: String,
    pub eps: PassThrough,
    #[serde(rename = "dividendYield")]
    pub dividend_yield: String,
    pub pbr: String,
    pub roe: String,
    pub bps: PassThrough,
}

impl NormalizedRecord {
    /// Merges the three independently sourced parts of a quote.
    pub fn build(
        code: &TickerCode,
        snapshot: &QuoteSnapshot,
        figures: &StatementFigures,
        display_name: Option<String>,
    ) -> Self {
        let company_name = display_name
            .or_else(|| snapshot.long_name.clone())
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        let (change, change_percent) =
            format::price_delta(snapshot.regular_market_price, snapshot.previous_close);

        Self {
            company_name,
            code: code.to_string(),
            market: format::market(snapshot.exchange.as_deref()),
            price: format::price(snapshot.regular_market_price),
            change,
            change_percent,
            market_cap: format::currency(snapshot.market_cap),
            pretax_income: format::currency(figures.pretax_income),
            net_income: format::currency(figures.net_income),
            sales_latest: format::currency(figures.total_revenue),
            eps: PassThrough::from_option(snapshot.trailing_eps),
            dividend_yield: format::dividend_yield(snapshot.dividend_yield),
            pbr: format::price_to_book(snapshot.price_to_book),
            roe: format::return_on_equity(snapshot.return_on_equity),
            bps: PassThrough::from_option(snapshot.book_value),
        }
    }
}

/// Resolves one code into a [`NormalizedRecord`].
#[derive(Debug, Clone)]
pub struct StockService {
    resolver: ExchangeResolver,
    names: NameResolver,
    financials: FinancialsFetcher,
}

impl StockService {
    pub fn new(
        resolver: ExchangeResolver,
        names: NameResolver,
        financials: FinancialsFetcher,
    ) -> Self {
        Self {
            resolver,
            names,
            financials,
        }
    }

    /// Wires every component to one shared [`QuoteClient`].
    pub fn from_client(client: QuoteClient, config: &QuoteConfig) -> Self {
        let client = Arc::new(client);
        Self::new(
            ExchangeResolver::new(client.clone(), config.strategy, config.lookup_timeout),
            NameResolver::new(client.clone(), config.name_timeout, config.name_jitter),
            FinancialsFetcher::new(client, config.financials_timeout),
        )
    }

    /// # Errors
    ///
    /// `QuoteError::EmptyCode` for a blank code and `QuoteError::TickerNotFound`
    /// when no exchange suffix yields a quote.
    pub async fn get_stock_data(&self, code: &str) -> Result<NormalizedRecord> {
        let code = TickerCode::new(code)?;
        let (symbol, snapshot) = self.resolver.resolve(&code).await?;

        let names = self.names.clone();
        let name_symbol = symbol.clone();
        let name_task = AbortOnDrop::new(tokio::spawn(async move {
            names.resolve_name(&name_symbol).await
        }));

        let financials = self.financials.clone();
        let figures_symbol = symbol.clone();
        let figures_task = AbortOnDrop::new(tokio::spawn(async move {
            financials.fetch_figures(&figures_symbol).await
        }));

        let (display_name, figures) = tokio::join!(name_task, figures_task);
        let display_name = display_name.unwrap_or_else(|e| {
            tracing::warn!("Name task for {} failed: {}", symbol, e);
            None
        });
        let figures = figures.unwrap_or_else(|e| {
            tracing::warn!("Statement task for {} failed: {}", symbol, e);
            StatementFigures::default()
        });

        Ok(NormalizedRecord::build(
            &code,
            &snapshot,
            &figures,
            display_name,
        ))
    }
}
