//! HTTP surface.
//!
//! Three GET routes sit on top of [`StockService`] and [`BatchAggregator`]:
//! a health check at `/`, a single quote at `/stock-data?code=...` and a
//! batch at `/multiple-stock-data?codes=a,b,c`.

mod routes;

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::batch::BatchAggregator;
use crate::config::QuoteConfig;
use crate::core::QuoteClient;
use crate::error::{QuoteError, Result};
use crate::options::BatchOptions;
use crate::pool::WorkerPool;
use crate::service::StockService;

pub use routes::{ErrorBody, HealthResponse};

/// Shared state handed to every route.
///
/// Single quotes and batch items run on the same [`WorkerPool`].
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<StockService>,
    pub pool: WorkerPool,
    pub batch: BatchAggregator,
}

impl AppState {
    pub fn new(service: Arc<StockService>, pool: WorkerPool, options: BatchOptions) -> Self {
        let batch = BatchAggregator::new(service.clone(), pool.clone(), options);
        Self {
            service,
            pool,
            batch,
        }
    }

    /// Builds the client, the service and the worker pool from one configuration.
    pub fn from_config(config: &QuoteConfig) -> Result<Self> {
        let client = QuoteClient::with_config(config)?;
        let service = Arc::new(StockService::from_client(client, config));
        let pool = WorkerPool::new(config.workers)?;
        Ok(Self::new(service, pool, config.batch.clone()))
    }
}

/// Listen address of the server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// Reads `API_HOST` and `API_PORT`, defaulting to 127.0.0.1:5000.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(host) = std::env::var("API_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|e| QuoteError::ConfigError(format!("Invalid API_PORT: {}", e)))?;
        }
        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| QuoteError::ConfigError(format!("Invalid listen address: {}", e)))
    }
}

/// Allowed origins come from comma-separated `CORS_ORIGINS`; any origin is
/// allowed when it is unset.
pub fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.trim().is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                tracing::warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                tracing::info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// Routes only, without middleware.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::health))
        .route("/stock-data", get(routes::stock_data))
        .route("/multiple-stock-data", get(routes::multiple_stock_data))
        .with_state(state)
}

/// Routes with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    routes(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}
