//! Saasify Server: application entry point.

use anyhow::Context;
use saasify_db::DbManager;
use saasify_server::app::{AppState, build_router};
use saasify_server::config::ServerConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("saasify=info"))
        .context("build log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();

    tracing::info!("Starting Saasify server...");

    let config = ServerConfig::from_env()?;
    let db = DbManager::global(&config.db)
        .await
        .context("connect to SurrealDB")?;

    let app = build_router(AppState::new(db.client().clone(), config.auth.clone()));

    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, "Saasify server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("Saasify server stopped.");
    Ok(())
}
