//! Batch fan-out across many ticker codes.
//!
//! Each code becomes one job on the shared [`WorkerPool`]. Results are
//! collected in completion order and every entry carries the code it came
//! from, so one slow or failing code never affects its siblings.

use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::sync::Arc;

use super::error::{QuoteError, Result};
use super::options::BatchOptions;
use super::pool::WorkerPool;
use super::service::{NormalizedRecord, StockService};

/// Error entry inside a batch response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub error: String,
    pub code: String,
}

/// Outcome for one code of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Success(NormalizedRecord),
    Failure(BatchFailure),
}

impl BatchEntry {
    fn failure(code: impl Into<String>, error: &QuoteError) -> Self {
        BatchEntry::Failure(BatchFailure {
            error: error.to_string(),
            code: code.into(),
        })
    }

    /// The code this entry was requested with.
    pub fn code(&self) -> &str {
        match self {
            BatchEntry::Success(record) => &record.code,
            BatchEntry::Failure(failure) => &failure.code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BatchEntry::Success(_))
    }
}

/// Splits a comma-separated code list, trimming entries and dropping blanks.
pub fn split_codes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct BatchAggregator {
    service: Arc<StockService>,
    pool: WorkerPool,
    options: BatchOptions,
}

impl BatchAggregator {
    pub fn new(service: Arc<StockService>, pool: WorkerPool, options: BatchOptions) -> Self {
        Self {
            service,
            pool,
            options,
        }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Checks the batch size before any work is scheduled.
    pub fn validate(&self, codes: &[String]) -> Result<()> {
        if codes.is_empty() {
            return Err(QuoteError::EmptyBatch);
        }
        if codes.len() > self.options.max_size {
            return Err(QuoteError::BatchTooLarge {
                size: codes.len(),
                max: self.options.max_size,
            });
        }
        Ok(())
    }

    /// Resolves every code and returns one entry per code, in completion order.
    ///
    /// # Errors
    ///
    /// Only validation errors; per-code failures become [`BatchEntry::Failure`].
    pub async fn get_many(&self, codes: Vec<String>) -> Result<Vec<BatchEntry>> {
        self.validate(&codes)?;

        let item_timeout = self.options.item_timeout;
        let mut pending: FuturesUnordered<_> = codes
            .into_iter()
            .map(|code| {
                let service = self.service.clone();
                let job_code = code.clone();
                let handle = self.pool.spawn(async move {
                    match tokio::time::timeout(item_timeout, service.get_stock_data(&job_code))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(QuoteError::Timeout { code: job_code }),
                    }
                });
                async move { (code, handle.await) }
            })
            .collect();

        let mut entries = Vec::with_capacity(pending.len());
        while let Some((code, joined)) = pending.next().await {
            let entry = match joined {
                Ok(Ok(record)) => BatchEntry::Success(record),
                Ok(Err(e)) => {
                    tracing::warn!("Batch item {} failed: {}", code, e);
                    BatchEntry::failure(code, &e)
                }
                Err(e) => {
                    tracing::error!("Batch task for {} aborted: {}", code, e);
                    let error = QuoteError::TaskFailed {
                        code: code.clone(),
                        reason: e.to_string(),
                    };
                    BatchEntry::failure(code, &error)
                }
            };
            entries.push(entry);
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_codes_drops_blanks() {
        assert_eq!(
            split_codes(" 7203, ,6758,,9984 "),
            vec!["7203".to_string(), "6758".to_string(), "9984".to_string()]
        );
        assert!(split_codes(" , ,").is_empty());
    }

    #[test]
    fn failure_entry_serializes_with_code() {
        let entry = BatchEntry::failure(
            "0000",
            &QuoteError::TickerNotFound {
                code: "0000".to_string(),
            },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["code"], "0000");
        assert_eq!(
            json["error"],
            "No quote data found for code 0000 on any exchange"
        );
        assert_eq!(entry.code(), "0000");
        assert!(!entry.is_success());
    }
}
