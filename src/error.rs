use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Resource not found")]
    NotFound,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Ticker code must not be empty")]
    EmptyCode,

    #[error("No quote data found for code {code} on any exchange")]
    TickerNotFound { code: String },

    #[error("No ticker codes were given")]
    EmptyBatch,

    #[error("Too many ticker codes: {size} given, at most {max} allowed")]
    BatchTooLarge { size: usize, max: usize },

    #[error("Timed out while fetching data for code {code}")]
    Timeout { code: String },

    #[error("Task for code {code} failed: {reason}")]
    TaskFailed { code: String, reason: String },
}

impl QuoteError {
    /// Returns true for errors raised by input validation, before any network work.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            QuoteError::EmptyCode | QuoteError::EmptyBatch | QuoteError::BatchTooLarge { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;
