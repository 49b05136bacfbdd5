use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use ride_hailing_api::api;
use ride_hailing_api::config::Config;
use ride_hailing_api::error::AppError;
use ride_hailing_api::state::AppState;
use ride_hailing_api::store::{DocumentStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let store: Arc<dyn DocumentStore> = match &config.database_name {
        Some(name) => {
            tracing::info!(database = %name, "document store initialized");
            Arc::new(MemoryStore::new(name.clone()))
        }
        None => {
            tracing::warn!("DATABASE_NAME is empty; starting with a detached store");
            Arc::new(MemoryStore::detached())
        }
    };

    let shared_state = Arc::new(AppState::new(store, config.event_buffer_size));
    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
