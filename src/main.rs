use jpquote::server::{AppState, ServerConfig, router};
use jpquote::QuoteConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jpquote=info,tower_http=debug".into()),
        )
        .init();

    let config = QuoteConfig::from_env()?;
    let server = ServerConfig::from_env()?;
    let addr = server.socket_addr()?;

    info!(
        workers = config.workers,
        max_batch = config.batch.max_size,
        strategy = ?config.strategy,
        "Starting stock data server"
    );

    let state = AppState::from_config(&config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Stock data server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Stock data server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
