mod app;
mod auth;
mod config;
mod dto;
mod error;
mod handlers;
mod middleware;
mod models;
mod repository;
mod service;

use chrono::Duration;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use std::sync::Arc;

use app::AppState;
use auth::TokenKeys;
use config::ServerConfig;
use middleware::RequestLog;
use repository::{Repository, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    init_tracing(&config.log_level);
    tracing::info!("Starting with {config:?}");

    // Repository creation and migration
    let repo = Repository::new(&config.database_url, config.database_pool_size).inspect_err(|e| {
        tracing::error!("failed to set up the database pool: {e}");
    })?;
    repo.migrate().await.inspect_err(|e| {
        tracing::error!("failed to migrate database: {e}");
    })?;
    let store: Arc<dyn Store> = Arc::new(repo);

    let (request_log, log_writer) = RequestLog::spawn(store.clone(), config.request_log_capacity);
    let tokens = Arc::new(TokenKeys::new(
        &config.jwt_secret,
        Duration::hours(config.token_ttl_hours),
    ));

    let app = app::router(AppState::new(store, tokens, request_log));

    let listener = TcpListener::bind(config.socket_addr()).await?;
    tracing::info!("Started listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router held the last sender; wait for queued log entries to land.
    if let Err(e) = log_writer.await {
        tracing::warn!("request log writer ended abnormally: {e}");
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
