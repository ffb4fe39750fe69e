use async_trait::async_trait;
use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware, state::InMemoryState,
    state::NotKeyed,
};
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::config::{QuoteConfig, QuoteUrls};
use super::error::{QuoteError, Result};
use super::parsing::quote_summary::{
    SNAPSHOT_MODULES, STATEMENT_MODULES, parse_snapshot, parse_statement,
};
use super::snapshot::{QuoteSnapshot, StatementTable};
use super::symbol::ResolvedSymbol;
use super::traits::{MarketDataSource, NamePageSource, StatementSource};

const MAX_RETRIES: u32 = 2;
const INITIAL_BACKOFF_MS: u64 = 250;

type Governor = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// HTTP client for the upstream quote and name sources with built-in rate
/// limiting and retry logic.
///
/// One client is shared by every request the service handles. The token
/// bucket caps the combined request rate against the upstream hosts, so a
/// burst of batch lookups cannot flood them:
///
/// ```text
/// Token Bucket (capacity: rate_limit tokens)
/// ┌──────────────────────────┐
/// │ ████████████████████████ │  ← Tokens refill at rate_limit/sec
/// └──────────────────────────┘
///      ↓ consume on request
/// ```
///
/// Rate limit responses (HTTP 429) and transport failures are retried a
/// couple of times with exponential backoff and jitter; 404 is reported as
/// [`QuoteError::NotFound`] straight away.
///
/// # Examples
///
/// ```rust
/// # use jpquote::QuoteClient;
/// let client = QuoteClient::new()?;
/// # Ok::<(), jpquote::QuoteError>(())
/// ```
#[derive(Debug, Clone)]
pub struct QuoteClient {
    /// HTTP client for making requests
    pub(crate) client: reqwest::Client,

    /// Token bucket rate limiter shared by all clones
    pub(crate) rate_limiter: Arc<Governor>,

    /// Base URL for the quote summary endpoint
    pub(crate) quote_summary_url: String,

    /// Base URL for the localized name page
    pub(crate) name_page_url: String,
}

impl QuoteClient {
    /// Creates a client with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(&QuoteConfig::default())
    }

    /// Creates a client from custom configuration settings.
    ///
    /// # Errors
    ///
    /// Returns `QuoteError::ConfigError` if the user agent is malformed, the rate limit
    /// is zero, or the HTTP client cannot be built with the provided configuration.
    pub fn with_config(config: &QuoteConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| QuoteError::ConfigError(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ja,en;q=0.8"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| QuoteError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(config.rate_limit).ok_or_else(|| {
                QuoteError::ConfigError("Rate limit must be greater than zero".to_string())
            })?,
        )));

        let QuoteUrls {
            quote_summary,
            name_page,
        } = config.base_urls.clone();

        Ok(QuoteClient {
            client,
            rate_limiter,
            quote_summary_url: quote_summary.trim_end_matches('/').to_string(),
            name_page_url: name_page.trim_end_matches('/').to_string(),
        })
    }

    /// Wait before retry `retry` (0-indexed): `(2^retry × 250ms) ± 10%`.
    fn calculate_backoff(retry: u32) -> Duration {
        let backoff_ms = INITIAL_BACKOFF_MS * (2_u64.pow(retry));
        let jitter = (backoff_ms as f64 * 0.2 * (fastrand::f64() - 0.5)) as i64;
        Duration::from_millis((backoff_ms as i64 + jitter) as u64)
    }

    /// Fetches text content from a URL with rate limiting and retries.
    ///
    /// # Errors
    ///
    /// * `QuoteError::NotFound` - Resource doesn't exist (HTTP 404)
    /// * `QuoteError::RateLimitExceeded` - Max retries exhausted for rate limits
    /// * `QuoteError::RequestError` - Network or HTTP errors
    /// * `QuoteError::InvalidResponse` - Unexpected status codes with content preview
    pub async fn get(&self, url: &str) -> Result<String> {
        let mut retries = 0;

        loop {
            self.rate_limiter.until_ready().await;

            match self.client.get(url).send().await {
                Ok(response) => match response.status() {
                    reqwest::StatusCode::OK => {
                        return response.text().await.map_err(QuoteError::RequestError);
                    }
                    reqwest::StatusCode::NOT_FOUND => {
                        return Err(QuoteError::NotFound);
                    }
                    reqwest::StatusCode::TOO_MANY_REQUESTS => {
                        if retries >= MAX_RETRIES {
                            return Err(QuoteError::RateLimitExceeded);
                        }

                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|h| h.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .map(Duration::from_secs)
                            .unwrap_or_else(|| Self::calculate_backoff(retries));

                        tracing::warn!(
                            "Rate limit hit (429) for {}. Attempt {}/{}. Waiting for {:?} before retry.",
                            url,
                            retries + 1,
                            MAX_RETRIES + 1,
                            retry_after
                        );
                        sleep(retry_after).await;
                        retries += 1;
                    }
                    other_status => {
                        let error_body = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Failed to read error body".to_string());

                        return Err(QuoteError::InvalidResponse(format!(
                            "Unexpected status code: {} for URL: {}. Response preview: {}",
                            other_status,
                            url,
                            error_body.chars().take(200).collect::<String>()
                        )));
                    }
                },
                Err(e) => {
                    if retries >= MAX_RETRIES || e.is_builder() {
                        return Err(QuoteError::RequestError(e));
                    }
                    let backoff = Self::calculate_backoff(retries);
                    tracing::warn!(
                        "Request failed for {}: {:?}. Attempt {}/{}. Retrying in {:?}.",
                        url,
                        e,
                        retries + 1,
                        MAX_RETRIES + 1,
                        backoff
                    );
                    sleep(backoff).await;
                    retries += 1;
                }
            }
        }
    }

    fn quote_summary_endpoint(&self, symbol: &ResolvedSymbol, modules: &str) -> String {
        format!(
            "{}/{}?modules={}",
            self.quote_summary_url,
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(modules)
        )
    }

    /// Returns the base URL for the quote summary endpoint.
    pub fn quote_summary_url(&self) -> &str {
        &self.quote_summary_url
    }

    /// Returns the base URL for the name page.
    pub fn name_page_url(&self) -> &str {
        &self.name_page_url
    }
}

#[async_trait]
impl MarketDataSource for QuoteClient {
    async fn lookup(&self, symbol: &ResolvedSymbol) -> Result<QuoteSnapshot> {
        let url = self.quote_summary_endpoint(symbol, SNAPSHOT_MODULES);
        let body = self.get(&url).await?;
        parse_snapshot(&body)
    }
}

#[async_trait]
impl StatementSource for QuoteClient {
    async fn statement_for(&self, symbol: &ResolvedSymbol) -> Result<StatementTable> {
        let url = self.quote_summary_endpoint(symbol, STATEMENT_MODULES);
        let body = self.get(&url).await?;
        parse_statement(&body)
    }
}

#[async_trait]
impl NamePageSource for QuoteClient {
    async fn fetch_page(&self, symbol: &ResolvedSymbol) -> Result<String> {
        let url = format!(
            "{}/{}",
            self.name_page_url,
            urlencoding::encode(symbol.as_str())
        );
        self.get(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{ExchangeSuffix, TickerCode};

    #[test]
    fn test_calculate_backoff() {
        let backoff0 = QuoteClient::calculate_backoff(0);
        let backoff1 = QuoteClient::calculate_backoff(1);
        let backoff2 = QuoteClient::calculate_backoff(2);

        assert!(backoff0 < backoff1);
        assert!(backoff1 < backoff2);

        assert!(backoff0.as_millis() >= 225 && backoff0.as_millis() <= 275);
        assert!(backoff1.as_millis() >= 450 && backoff1.as_millis() <= 550);
        assert!(backoff2.as_millis() >= 900 && backoff2.as_millis() <= 1100);
    }

    #[test]
    fn zero_rate_limit_is_rejected() {
        let config = QuoteConfig {
            rate_limit: 0,
            ..Default::default()
        };
        assert!(matches!(
            QuoteClient::with_config(&config),
            Err(QuoteError::ConfigError(_))
        ));
    }

    #[test]
    fn endpoint_includes_symbol_and_modules() {
        let client = QuoteClient::new().unwrap();
        let symbol = ResolvedSymbol::new(TickerCode::new("7203").unwrap(), ExchangeSuffix::Tokyo);
        let url = client.quote_summary_endpoint(&symbol, "price,summaryDetail");
        assert!(url.ends_with("/quoteSummary/7203.T?modules=price%2CsummaryDetail"));
    }
}
