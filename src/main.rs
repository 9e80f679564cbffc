//! Upload Registry - signed-upload cache and recent-uploads list
//!
//! HTTP entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use upload_registry::api::{create_router, AppState};
use upload_registry::config::Config;
use upload_registry::store::{MemoryStore, RedisStore, SharedStore};
use upload_registry::tasks::spawn_cleanup_task;

/// Main entry point for the upload registry server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the shared store (Redis, or in-memory with a sweep task)
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. On SIGINT/SIGTERM, stop accepting requests and close the store
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upload_registry=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting upload registry server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, signature_ttl={}s, max_stored={}, folder='{}'",
        config.server_port, config.signature_ttl, config.max_stored, config.folder
    );
    if config.api_secret.is_none() {
        warn!("CLOUDINARY_API_SECRET is not set; upload signatures will fail");
    }

    let (store, cleanup_handle) = open_store(&config).await?;
    info!("Store opened ({})", store.backend());

    let app = create_router(AppState::new(store.clone(), config.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
    store.close().await.context("failed to close store")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Opens Redis when a URL is configured, otherwise the in-memory store plus its sweep task.
async fn open_store(config: &Config) -> anyhow::Result<(SharedStore, Option<JoinHandle<()>>)> {
    match &config.redis_url {
        Some(url) => {
            let store: SharedStore = Arc::new(
                RedisStore::open(url, config.store_timeout())
                    .await
                    .context("failed to connect to Redis")?,
            );
            Ok((store, None))
        }
        None => {
            warn!("REDIS_URL is not set; using the in-memory store");
            let store = Arc::new(MemoryStore::new());
            let handle = spawn_cleanup_task(store.clone(), config.cleanup_interval);
            let store: SharedStore = store;
            Ok((store, Some(handle)))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
