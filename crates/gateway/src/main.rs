//! NewsNotes API Gateway binary
//!
//! Loads configuration, connects to the database, makes sure the tables
//! exist and serves the API until Ctrl+C / SIGTERM.

use newsnotes_common::{
    config::{AppConfig, ObservabilityConfig},
    db::{schema, DbPool, Repository},
    metrics, HttpFetcher, ScrapeService,
};
use newsnotes_gateway::{create_router, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load environment variables and configuration
    dotenvy::dotenv().ok();
    let config = Arc::new(AppConfig::load()?);

    // 2. Initialize tracing
    init_tracing(&config.observability);

    info!(
        version = newsnotes_common::VERSION,
        service = %config.observability.service_name,
        "Starting NewsNotes gateway"
    );

    // 3. Initialize metrics
    let metrics = if config.observability.metrics_enabled {
        Some(metrics::install_recorder()?)
    } else {
        None
    };

    // 4. Initialize database connection
    let db = DbPool::new(&config.database).await?;
    if config.database.auto_create_schema {
        schema::ensure_schema(db.write()).await?;
    }

    // 5. Initialize the scraper
    let fetcher = Arc::new(HttpFetcher::new(&config.scraper)?);
    let scraper = Arc::new(ScrapeService::new(fetcher, Repository::new(db.clone()), &config.scraper)?);
    info!(target_url = %scraper.target_url(), "Scraper ready");

    // 6. Create app state and router
    let state = AppState {
        config: config.clone(),
        db,
        scraper,
        metrics,
    };
    let app = create_router(state);

    // 7. Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().with_current_span(true).init();
    } else {
        builder.init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
