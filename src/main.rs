use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use linkpulse::api;
use linkpulse::config::{Config, DatabaseBackend};
use linkpulse::storage::{PostgresStorage, SqliteStorage, Storage};
use linkpulse::tracking;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage
    let storage: Arc<dyn Storage> = match config.database.backend {
        DatabaseBackend::Sqlite => {
            info!("Using SQLite storage: {}", config.database.url);
            Arc::new(
                SqliteStorage::new(&config.database.url, config.database.max_connections).await?,
            )
        }
        DatabaseBackend::Postgres => {
            info!("Using PostgreSQL storage: {}", config.database.url);
            Arc::new(
                PostgresStorage::new(&config.database.url, config.database.max_connections).await?,
            )
        }
    };

    // Initialize database
    info!("Initializing database...");
    storage.init().await?;
    info!("Database initialized successfully");

    // Create routers
    let tracking_router = tracking::create_tracking_router(Arc::clone(&storage));
    let api_router = api::create_api_router(Arc::clone(&storage), config.database.backend);

    // Start tracking server
    let tracking_addr = format!(
        "{}:{}",
        config.tracking_server.host, config.tracking_server.port
    );
    let tracking_listener = tokio::net::TcpListener::bind(&tracking_addr).await?;
    info!("🚀 Tracking server listening on http://{}", tracking_addr);
    info!("   - Tracking endpoints available at http://{}/track/...", tracking_addr);

    // Start API server
    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("🚀 API server listening on http://{}", api_addr);
    info!("   - Dashboard endpoints available at http://{}/api/...", api_addr);

    // Run both servers concurrently
    tokio::try_join!(
        axum::serve(tracking_listener, tracking_router),
        axum::serve(api_listener, api_router),
    )?;

    Ok(())
}
