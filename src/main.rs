//! Classifier Service - a REST API for classifier records
//!
//! Serves classifiers from SQLite through an in-process cache-aside layer.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use classifier_service::store::{
    ClassifierStore, ConnectionStatsSource, MemoryClassifierStore, SqliteClassifierStore,
};
use classifier_service::{create_router, AppState, ClassifierRepository, Config, StatsSampler};

/// The store chosen by `DB_DSN`, seen through each interface it serves.
struct Backend {
    store: Arc<dyn ClassifierStore>,
    stats: Arc<dyn ConnectionStatsSource>,
    sqlite: Option<SqliteClassifierStore>,
}

/// Main entry point for the classifier service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the store and apply migrations
/// 4. Create the repository (starts the cache sweep) and the stats sampler
/// 5. Create Axum router with all endpoints
/// 6. Serve until SIGINT/SIGTERM
/// 7. Close repository, sampler and store, in that order
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "classifier_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Classifier Service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: addr={}, max_open_conns={}, sweep_interval={}s, stats_interval={}s",
        config.server_addr,
        config.db_max_open_conns,
        config.cache_sweep_interval,
        config.stats_interval
    );

    let backend = open_backend(&config).await?;

    let repository = Arc::new(ClassifierRepository::new(
        backend.store.clone(),
        config.repository_config(),
    ));
    let sampler = Arc::new(StatsSampler::spawn(
        backend.stats.clone(),
        config.stats_interval(),
    ));

    let app = create_router(AppState::new(repository.clone(), sampler.clone()));

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server_addr))?;
    info!("Server listening on http://{}", config.server_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    repository.close()?;
    sampler.close();
    if let Some(sqlite) = backend.sqlite {
        sqlite.close().await;
        info!("Store connections closed");
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn open_backend(config: &Config) -> anyhow::Result<Backend> {
    if config.uses_memory_store() {
        info!("Using in-memory store");
        let memory = Arc::new(MemoryClassifierStore::new());
        let store: Arc<dyn ClassifierStore> = memory.clone();
        let stats: Arc<dyn ConnectionStatsSource> = memory;
        return Ok(Backend {
            store,
            stats,
            sqlite: None,
        });
    }

    let sqlite = SqliteClassifierStore::connect(&config.store_options())
        .await
        .context("failed to open store")?;
    sqlite
        .migrate()
        .await
        .context("failed to apply migrations")?;
    info!("Migrations applied");

    let shared = Arc::new(sqlite.clone());
    let store: Arc<dyn ClassifierStore> = shared.clone();
    let stats: Arc<dyn ConnectionStatsSource> = shared;
    Ok(Backend {
        store,
        stats,
        sqlite: Some(sqlite),
    })
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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
