//! Server initialization
//!
//! Opens the store, syncs the badge catalog, assembles the router and runs
//! the HTTP server until Ctrl-C.

use anyhow::{Context, Result};
use axum::{routing::get, Extension, Router};
use scholia_core::{BadgeCatalog, GamificationEngine, Store, DEFAULT_BADGES};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use super::config::AppConfig;
use super::loader::load_config;
use super::validation::validate_production_config;
use crate::middleware::auth::AuthSettings;

fn load_catalog(catalog_path: &str) -> Result<BadgeCatalog> {
    if catalog_path.is_empty() {
        return BadgeCatalog::from_toml_str(DEFAULT_BADGES).context("Invalid built-in badge catalog");
    }

    let source = std::fs::read_to_string(catalog_path)
        .with_context(|| format!("Failed to read badge catalog {catalog_path}"))?;
    BadgeCatalog::from_toml_str(&source)
        .with_context(|| format!("Invalid badge catalog {catalog_path}"))
}

/// Open the database, create the schema and sync the badge catalog
pub async fn open_engine(config: &AppConfig) -> Result<Arc<GamificationEngine>> {
    let store = Store::from_path(Path::new(&config.database.path), config.database.max_connections)
        .await
        .context("Failed to open database")?;

    let catalog = load_catalog(&config.gamification.catalog_path)?;
    store
        .sync_badge_catalog(&catalog)
        .await
        .context("Failed to sync badge catalog")?;
    info!("Badge catalog synced ({} badges)", catalog.len());

    Ok(Arc::new(GamificationEngine::new(
        store,
        config.gamification.rewards.clone(),
    )))
}

/// Assemble the router with every endpoint and shared layer
pub fn build_app(engine: Arc<GamificationEngine>, auth: AuthSettings) -> Router {
    Router::new()
        // Health endpoint (public, for LB)
        .merge(crate::api::health_routes())
        // API documentation (Swagger UI at /docs)
        .merge(crate::api::docs_routes())
        // API routes (identity resolved per-handler via RequireUser extractor)
        .merge(crate::api::api_router())
        .route("/", get(|| async { "Scholia" }))
        // Layers (applied to all routes)
        .layer(Extension(engine))
        .layer(Extension(Arc::new(auth)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the server
pub async fn run() -> Result<()> {
    let config = load_config()?;
    validate_production_config(&config);

    let engine = open_engine(&config).await?;
    let auth = AuthSettings::new(
        &config.server.auth.identity_header,
        &config.server.auth.sync_secret,
    );
    let app = build_app(engine, auth);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Scholia shutdown complete");
    Ok(())
}
