//! Health check endpoint
//!
//! `/health` reports the version and whether the database answers.

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use scholia_core::GamificationEngine;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// Health check (for load balancers)
async fn health_check(
    Extension(engine): Extension<Arc<GamificationEngine>>,
) -> (StatusCode, Json<HealthResponse>) {
    let (status, code, database) = match engine.store().ping().await {
        Ok(()) => ("healthy", StatusCode::OK, "healthy"),
        Err(e) => {
            warn!("Database health check failed: {}", e);
            ("unhealthy", StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
        }),
    )
}

/// Create health routes
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_check))
}
