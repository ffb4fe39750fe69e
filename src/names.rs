use std::sync::Arc;
use std::time::Duration;

use super::parsing::name_page::{DEFAULT_STRATEGIES, NameStrategy, extract_display_name};
use super::symbol::ResolvedSymbol;
use super::traits::NamePageSource;

/// Best-effort lookup of the localized company name.
///
/// Never fails: transport errors, timeouts and pages without a Japanese
/// heading all come back as `None`. A random delay of up to `jitter` is
/// applied before the request so concurrent lookups do not hit the page
/// source in lockstep.
#[derive(Clone)]
pub struct NameResolver {
    source: Arc<dyn NamePageSource>,
    strategies: Vec<NameStrategy>,
    timeout: Duration,
    jitter: Duration,
}

impl NameResolver {
    pub fn new(source: Arc<dyn NamePageSource>, timeout: Duration, jitter: Duration) -> Self {
        Self {
            source,
            strategies: DEFAULT_STRATEGIES.to_vec(),
            timeout,
            jitter,
        }
    }

    pub fn with_strategies(mut self, strategies: Vec<NameStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    fn pre_request_delay(&self) -> Duration {
        let max_ms = self.jitter.as_millis() as u64;
        if max_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(fastrand::u64(0..=max_ms))
        }
    }

    pub async fn resolve_name(&self, symbol: &ResolvedSymbol) -> Option<String> {
        let delay = self.pre_request_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let page = match tokio::time::timeout(self.timeout, self.source.fetch_page(symbol)).await {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                tracing::warn!("Name page for {} unavailable: {}", symbol, e);
                return None;
            }
            Err(_) => {
                tracing::warn!("Name page for {} timed out after {:?}", symbol, self.timeout);
                return None;
            }
        };

        let name = extract_display_name(&page, &self.strategies);
        if name.is_none() {
            tracing::debug!("No localized name found on page for {}", symbol);
        }
        name
    }
}

impl std::fmt::Debug for NameResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameResolver")
            .field("strategies", &self.strategies)
            .field("timeout", &self.timeout)
            .field("jitter", &self.jitter)
            .finish_non_exhaustive()
    }
}
