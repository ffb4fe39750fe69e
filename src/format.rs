//! Display formatting for normalized quote records.
//!
//! Every function here is pure. Absent inputs turn into [`PLACEHOLDER`]
//! or a zero value depending on the field, matching what the API has always
//! returned for missing data.

use serde::Serialize;

/// Shown wherever a value is unknown.
pub const PLACEHOLDER: &str = "---";

const TRILLION: f64 = 1e12;
const HUNDRED_MILLION: f64 = 1e8;

/// Upstream exchange identifiers and their localized market names.
const MARKET_NAMES: &[(&str, &str)] = &[
    ("JPX", "東証"),
    ("TYO", "東証"),
    ("OSA", "大証"),
    ("NGO", "名証"),
    ("FKA", "福証"),
    ("SAP", "札証"),
];

/// A value passed through unformatted, or the placeholder when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PassThrough {
    Number(f64),
    Text(String),
}

impl PassThrough {
    pub fn from_option(value: Option<f64>) -> Self {
        match value.filter(|v| v.is_finite()) {
            Some(v) => PassThrough::Number(v),
            None => PassThrough::Text(PLACEHOLDER.to_string()),
        }
    }
}

/// Inserts thousands separators into the integer part of an already
/// formatted decimal string ("1234567.89" -> "1,234,567.89").
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(idx) => unsigned.split_at(idx),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}{}{}", sign, grouped, frac_part)
}

/// Yen amount in 兆円 at or above one trillion, otherwise in 億円.
pub fn currency(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return PLACEHOLDER.to_string();
    };

    if value.abs() >= TRILLION {
        format!("{} 兆円", group_thousands(&format!("{:.2}", value / TRILLION)))
    } else {
        format!(
            "{} 億円",
            group_thousands(&format!("{:.2}", value / HUNDRED_MILLION))
        )
    }
}

/// Dividend yield as a percentage.
///
/// Upstream reports the yield either as a fraction (0.025) or already scaled
/// (2.5). Values strictly between 0 and 1 are treated as fractions. This is a
/// heuristic: a genuine 0.5% yield reported as 0.5 comes out as 50.00 %.
pub fn dividend_yield(value: Option<f64>) -> String {
    let raw = value.filter(|v| v.is_finite()).unwrap_or(0.0);
    let percent = if raw > 0.0 && raw < 1.0 { raw * 100.0 } else { raw };
    format!("{:.2} %", percent)
}

/// Share price with thousands separators; whole prices carry no decimals.
pub fn price(value: Option<f64>) -> String {
    let value = value.filter(|v| v.is_finite()).unwrap_or(0.0);
    if value.fract() == 0.0 {
        group_thousands(&format!("{:.0}", value))
    } else {
        let formatted = format!("{:.2}", value);
        let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
        group_thousands(trimmed)
    }
}

/// Price-to-book ratio with two decimals.
pub fn price_to_book(value: Option<f64>) -> String {
    format!("{:.2}", value.filter(|v| v.is_finite()).unwrap_or(0.0))
}

/// Return on equity; upstream always supplies a fraction.
pub fn return_on_equity(value: Option<f64>) -> String {
    format!(
        "{:.2} %",
        value.filter(|v| v.is_finite()).unwrap_or(0.0) * 100.0
    )
}

/// Localized market name for an upstream exchange identifier.
pub fn market(exchange: Option<&str>) -> String {
    match exchange {
        Some(id) => MARKET_NAMES
            .iter()
            .find(|(upstream, _)| *upstream == id)
            .map(|(_, local)| local.to_string())
            .unwrap_or_else(|| id.to_string()),
        None => PLACEHOLDER.to_string(),
    }
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Price change and percentage change against the previous close.
///
/// Both are zero unless both inputs are present and the previous close is
/// non-zero.
pub fn price_delta(current: Option<f64>, previous_close: Option<f64>) -> (f64, f64) {
    match (current, previous_close) {
        (Some(current), Some(previous))
            if current.is_finite() && previous.is_finite() && previous != 0.0 =>
        {
            let change = current - previous;
            (round2(change), round2(change / previous * 100.0))
        }
        _ => (0.0, 0.0),
    }
}
