//! Decoder for the upstream quote summary payload.
//!
//! The endpoint answers with an envelope of the form
//! `{"quoteSummary": {"result": [ {...modules...} ], "error": null}}` where each
//! numeric field is wrapped as `{"raw": 2500.0, "fmt": "2,500.00"}` and a field
//! the source knows nothing about is an empty object `{}`. Unknown symbols come
//! back with `result: null` and an `error` object; both decoders here map that
//! to empty output rather than an error so callers can apply their own
//! validity rules.

use serde::Deserialize;
use std::collections::HashMap;

use crate::error::Result;
use crate::snapshot::{NET_INCOME, PRETAX_INCOME, QuoteSnapshot, StatementTable, TOTAL_REVENUE};

/// Modules requested for a quote snapshot
pub const SNAPSHOT_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData";
/// Modules requested for the income statement table
pub const STATEMENT_MODULES: &str = "incomeStatementHistory";

/// Upstream statement keys and the labels they are stored under.
const STATEMENT_LABELS: &[(&str, &str)] = &[
    ("totalRevenue", TOTAL_REVENUE),
    ("incomeBeforeTax", PRETAX_INCOME),
    ("netIncome", NET_INCOME),
    ("costOfRevenue", "Cost Of Revenue"),
    ("grossProfit", "Gross Profit"),
    ("operatingIncome", "Operating Income"),
    ("ebit", "EBIT"),
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    quote_summary: Option<Summary>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(default)]
    result: Option<Vec<Modules>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Modules {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(default)]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(default)]
    default_key_statistics: Option<KeyStatisticsModule>,
    #[serde(default)]
    financial_data: Option<FinancialDataModule>,
    #[serde(default)]
    income_statement_history: Option<IncomeStatementHistory>,
}

/// `{"raw": n, "fmt": "..."}` or `{}`
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

fn raw(value: &Option<RawValue>) -> Option<f64> {
    value
        .as_ref()
        .and_then(|v| v.raw)
        .filter(|v| v.is_finite())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    #[serde(default)]
    regular_market_price: Option<RawValue>,
    #[serde(default)]
    regular_market_previous_close: Option<RawValue>,
    #[serde(default)]
    market_cap: Option<RawValue>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetailModule {
    #[serde(default)]
    previous_close: Option<RawValue>,
    #[serde(default)]
    dividend_yield: Option<RawValue>,
    #[serde(default)]
    market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatisticsModule {
    #[serde(default)]
    price_to_book: Option<RawValue>,
    #[serde(default)]
    book_value: Option<RawValue>,
    #[serde(default)]
    trailing_eps: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialDataModule {
    #[serde(default)]
    current_price: Option<RawValue>,
    #[serde(default)]
    return_on_equity: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatementHistory {
    #[serde(default)]
    income_statement_history: Vec<HashMap<String, serde_json::Value>>,
}

fn first_result(body: &str) -> Result<Option<Modules>> {
    let envelope: Envelope = serde_json::from_str(body)?;
    let Some(summary) = envelope.quote_summary else {
        return Ok(None);
    };
    if let Some(error) = summary.error.filter(|e| !e.is_null()) {
        tracing::debug!("Quote summary returned an error object: {}", error);
        return Ok(None);
    }
    Ok(summary.result.and_then(|results| results.into_iter().next()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Decodes a quote summary body into a [`QuoteSnapshot`].
///
/// Malformed JSON is an error; a well-formed "not found" envelope is an
/// empty snapshot.
pub fn parse_snapshot(body: &str) -> Result<QuoteSnapshot> {
    let Some(modules) = first_result(body)? else {
        return Ok(QuoteSnapshot::default());
    };

    let price = modules.price.unwrap_or_default();
    let detail = modules.summary_detail.unwrap_or_default();
    let stats = modules.default_key_statistics.unwrap_or_default();
    let financial = modules.financial_data.unwrap_or_default();

    Ok(QuoteSnapshot {
        regular_market_price: raw(&price.regular_market_price)
            .or_else(|| raw(&financial.current_price)),
        previous_close: raw(&detail.previous_close)
            .or_else(|| raw(&price.regular_market_previous_close)),
        exchange: non_blank(price.exchange),
        dividend_yield: raw(&detail.dividend_yield),
        price_to_book: raw(&stats.price_to_book),
        return_on_equity: raw(&financial.return_on_equity),
        book_value: raw(&stats.book_value),
        market_cap: raw(&price.market_cap).or_else(|| raw(&detail.market_cap)),
        trailing_eps: raw(&stats.trailing_eps),
        long_name: non_blank(price.long_name),
    })
}

/// Decodes the income statement history into a [`StatementTable`].
///
/// Periods are kept in upstream order, which is most recent first.
pub fn parse_statement(body: &str) -> Result<StatementTable> {
    let mut table = StatementTable::new();
    let Some(modules) = first_result(body)? else {
        return Ok(table);
    };
    let periods = modules
        .income_statement_history
        .map(|h| h.income_statement_history)
        .unwrap_or_default();
    if periods.is_empty() {
        return Ok(table);
    }

    for (key, label) in STATEMENT_LABELS {
        let values: Vec<Option<f64>> = periods
            .iter()
            .map(|period| {
                period
                    .get(*key)
                    .and_then(|v| v.get("raw"))
                    .and_then(serde_json::Value::as_f64)
            })
            .collect();
        if values.iter().any(Option::is_some) {
            table.insert(*label, values);
        }
    }

    Ok(table)
}
