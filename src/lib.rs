//! # jpquote - Normalized quotes for Japanese ticker codes
//!
//! jpquote turns an exchange-agnostic Japanese security code such as `7203`
//! into a single display-ready record, combining a market data snapshot, the
//! latest income statement figures and the company's localized name.
//!
//! ## Features
//!
//! - **Exchange fallback** - Tries Tokyo, Nagoya, Fukuoka and Sapporo listings in order
//! - **Localized names** - Scrapes the Japanese company name with selector fallbacks
//! - **Statement figures** - Pretax income, net income and revenue from the latest period
//! - **Concurrent fan-out** - Name and statement lookups run in parallel per quote
//! - **Batch lookups** - Up to 20 codes at once on a bounded worker pool
//! - **HTTP server** - Optional axum front end behind the `server` feature
//!
//! ## Basic Usage
//!
//! ```ignore
//! use jpquote::{QuoteClient, QuoteConfig, StockService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = QuoteConfig::default();
//!     let client = QuoteClient::with_config(&config)?;
//!     let service = StockService::from_client(client, &config);
//!
//!     let record = service.get_stock_data("7203").await?;
//!     println!("{} {} ({:+.2}%)", record.company_name, record.price, record.change_percent);
//!
//!     Ok(())
//! }
//! ```

mod batch;
mod config;
mod core;
mod error;
mod financials;
pub mod format;
mod names;
mod options;
pub mod parsing;
mod pool;
mod resolver;
mod service;
mod snapshot;
mod symbol;
mod traits;

#[cfg(feature = "server")]
pub mod server;

pub use batch::{BatchAggregator, BatchEntry, BatchFailure, split_codes};
pub use config::{QuoteConfig, QuoteUrls};
pub use self::core::QuoteClient;
pub use error::{QuoteError, Result};
pub use financials::FinancialsFetcher;
pub use names::NameResolver;
pub use options::{BatchOptions, ResolveStrategy};
pub use pool::{AbortOnDrop, WorkerPool};
pub use resolver::ExchangeResolver;
pub use service::{NormalizedRecord, StockService};
pub use snapshot::{
    NET_INCOME, PRETAX_INCOME, QuoteSnapshot, StatementFigures, StatementTable, TOTAL_REVENUE,
};
pub use symbol::{ExchangeSuffix, ResolvedSymbol, TickerCode};
pub use traits::{MarketDataSource, NamePageSource, StatementSource};

/// Current crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
