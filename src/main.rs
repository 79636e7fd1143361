use anyhow::{Context, Result};
use goalgazer::api::{create_router, AppState};
use goalgazer::config::Config;
use goalgazer::content::ContentStore;
use goalgazer::db::Database;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("goalgazer=info".parse()?),
        )
        .init();

    info!("Starting GoalGazer API server");

    let config = Config::from_env()?;

    let db = Database::connect(&config.database_url, config.database_max_connections).await?;
    db.init_schema().await?;

    info!("Serving content from {}", config.content_dir.display());
    let content = ContentStore::new(config.content_dir.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let state = AppState::new(config, content, Arc::new(db.clone()));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
