use std::collections::HashMap;

/// Label of the pretax income row in a [`StatementTable`].
pub const PRETAX_INCOME: &str = "Pretax Income";
/// Label of the net income row in a [`StatementTable`].
pub const NET_INCOME: &str = "Net Income";
/// Label of the total revenue row in a [`StatementTable`].
pub const TOTAL_REVENUE: &str = "Total Revenue";

/// Point-in-time quote fields for one resolved symbol.
///
/// Every field is optional; upstream omits whatever it does not know about a
/// listing, and an unknown symbol typically comes back with nothing at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteSnapshot {
    pub regular_market_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub exchange: Option<String>,
    pub dividend_yield: Option<f64>,
    pub price_to_book: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub book_value: Option<f64>,
    pub market_cap: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub long_name: Option<String>,
}

impl QuoteSnapshot {
    pub fn is_empty(&self) -> bool {
        self.regular_market_price.is_none()
            && self.previous_close.is_none()
            && self.exchange.is_none()
            && self.dividend_yield.is_none()
            && self.price_to_book.is_none()
            && self.return_on_equity.is_none()
            && self.book_value.is_none()
            && self.market_cap.is_none()
            && self.trailing_eps.is_none()
            && self.long_name.is_none()
    }

    pub fn has_price(&self) -> bool {
        self.regular_market_price.is_some_and(f64::is_finite)
    }

    /// A lookup only counts when it returned data and a usable market price.
    pub fn is_valid(&self) -> bool {
        !self.is_empty() && self.has_price()
    }
}

/// Income statement rows keyed by label; values run from the most recent period backwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementTable {
    rows: HashMap<String, Vec<Option<f64>>>,
}

impl StatementTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, values: Vec<Option<f64>>) {
        self.rows.insert(label.into(), values);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, label: &str) -> Option<&[Option<f64>]> {
        self.rows.get(label).map(Vec::as_slice)
    }

    /// First column of the row, skipping NaN.
    pub fn latest(&self, label: &str) -> Option<f64> {
        self.row(label)
            .and_then(|values| values.first().copied().flatten())
            .filter(|value| !value.is_nan())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }
}

/// Selected income statement line items; each one is independently optional.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatementFigures {
    pub pretax_income: Option<f64>,
    pub net_income: Option<f64>,
    pub total_revenue: Option<f64>,
}

impl StatementFigures {
    pub fn from_table(table: &StatementTable) -> Self {
        if table.is_empty() {
            return Self::default();
        }
        Self {
            pretax_income: table.latest(PRETAX_INCOME),
            net_income: table.latest(NET_INCOME),
            total_revenue: table.latest(TOTAL_REVENUE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_is_invalid() {
        let snapshot = QuoteSnapshot::default();
        assert!(snapshot.is_empty());
        assert!(!snapshot.is_valid());
    }

    #[test]
    fn snapshot_without_price_is_invalid() {
        let snapshot = QuoteSnapshot {
            long_name: Some("Toyota Motor Corporation".to_string()),
            previous_close: Some(2450.0),
            ..Default::default()
        };
        assert!(!snapshot.is_empty());
        assert!(!snapshot.is_valid());
    }

    #[test]
    fn nan_price_is_not_a_price() {
        let snapshot = QuoteSnapshot {
            regular_market_price: Some(f64::NAN),
            ..Default::default()
        };
        assert!(!snapshot.has_price());
    }

    #[test]
    fn figures_take_first_column_independently() {
        let mut table = StatementTable::new();
        table.insert(TOTAL_REVENUE, vec![Some(45e12), Some(37e12)]);
        table.insert(NET_INCOME, vec![None, Some(2.4e12)]);

        let figures = StatementFigures::from_table(&table);
        assert_eq!(figures.total_revenue, Some(45e12));
        assert_eq!(figures.net_income, None);
        assert_eq!(figures.pretax_income, None);
    }

    #[test]
    fn empty_table_yields_no_figures() {
        assert_eq!(
            StatementFigures::from_table(&StatementTable::new()),
            StatementFigures::default()
        );
    }
}
