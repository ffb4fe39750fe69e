use std::sync::Arc;
use std::time::Duration;

use super::snapshot::StatementFigures;
use super::symbol::ResolvedSymbol;
use super::traits::StatementSource;

/// Extracts pretax income, net income and total revenue from the latest
/// statement period. Any failure yields all-absent figures.
#[derive(Clone)]
pub struct FinancialsFetcher {
    source: Arc<dyn StatementSource>,
    timeout: Duration,
}

impl FinancialsFetcher {
    pub fn new(source: Arc<dyn StatementSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    pub async fn fetch_figures(&self, symbol: &ResolvedSymbol) -> StatementFigures {
        match tokio::time::timeout(self.timeout, self.source.statement_for(symbol)).await {
            Ok(Ok(table)) => StatementFigures::from_table(&table),
            Ok(Err(e)) => {
                tracing::warn!("Statement for {} unavailable: {}", symbol, e);
                StatementFigures::default()
            }
            Err(_) => {
                tracing::warn!("Statement for {} timed out after {:?}", symbol, self.timeout);
                StatementFigures::default()
            }
        }
    }
}

impl std::fmt::Debug for FinancialsFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinancialsFetcher")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
