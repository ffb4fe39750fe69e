//! Ticker codes, exchange suffixes and resolved symbols.
//!
//! A raw code such as "7203" says nothing about where the security trades.
//! Upstream sources key their data by code plus a market suffix ("7203.T"),
//! so every request starts by pairing the code with the first suffix that
//! yields a usable quote.

use std::fmt;

use serde::Serialize;

use super::error::{QuoteError, Result};

/// User-supplied security code, exchange-agnostic (e.g. "7203").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TickerCode(String);

impl TickerCode {
    /// Trims the input and rejects blank codes.
    pub fn new(code: impl AsRef<str>) -> Result<Self> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(QuoteError::EmptyCode);
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Japanese market suffixes in lookup priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeSuffix {
    /// Tokyo Stock Exchange
    Tokyo,
    /// Nagoya Stock Exchange
    Nagoya,
    /// Fukuoka Stock Exchange
    Fukuoka,
    /// Sapporo Securities Exchange
    Sapporo,
}

impl ExchangeSuffix {
    pub const ALL: [ExchangeSuffix; 4] = [
        ExchangeSuffix::Tokyo,
        ExchangeSuffix::Nagoya,
        ExchangeSuffix::Fukuoka,
        ExchangeSuffix::Sapporo,
    ];

    pub fn as_suffix(&self) -> &'static str {
        match self {
            ExchangeSuffix::Tokyo => ".T",
            ExchangeSuffix::Nagoya => ".N",
            ExchangeSuffix::Fukuoka => ".F",
            ExchangeSuffix::Sapporo => ".S",
        }
    }
}

/// Code plus the suffix that produced a valid snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedSymbol {
    code: TickerCode,
    suffix: ExchangeSuffix,
    symbol: String,
}

impl ResolvedSymbol {
    pub fn new(code: TickerCode, suffix: ExchangeSuffix) -> Self {
        let symbol = format!("{}{}", code.as_str(), suffix.as_suffix());
        Self {
            code,
            suffix,
            symbol,
        }
    }

    pub fn code(&self) -> &TickerCode {
        &self.code
    }

    pub fn suffix(&self) -> ExchangeSuffix {
        self.suffix
    }

    /// Upstream symbol, e.g. "7203.T"
    pub fn as_str(&self) -> &str {
        &self.symbol
    }
}

impl fmt::Display for ResolvedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}
