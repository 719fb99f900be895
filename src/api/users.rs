//! User API endpoints
//!
//! POST /api/v1/auth/sync - Create or refresh a user on sign-in
//! GET  /api/v1/me - The signed-in user

use axum::{
    routing::{get, post},
    Extension, Router,
};
use scholia_core::{GamificationEngine, User, UserProfile};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use super::extract::ApiJson;
use super::{ok, ApiResult};
use crate::middleware::auth::{RequireSyncSecret, RequireUser};

/// Profile pushed by the identity provider's sign-in hook
#[derive(Debug, Deserialize, ToSchema)]
pub struct SyncUserRequest {
    pub external_id: String,
    pub name: String,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

impl From<SyncUserRequest> for UserProfile {
    fn from(request: SyncUserRequest) -> Self {
        Self {
            external_id: request.external_id,
            name: request.name,
            email: request.email,
            image_url: request.image_url,
        }
    }
}

/// Create or update a user from the identity provider
#[utoipa::path(
    post,
    path = "/api/v1/auth/sync",
    tag = "users",
    request_body = SyncUserRequest,
    responses(
        (status = 200, description = "Synced user"),
        (status = 400, description = "Empty external_id"),
        (status = 401, description = "Invalid sync secret")
    ),
    security(("sync_secret" = []))
)]
pub async fn sync_user(
    _secret: RequireSyncSecret,
    Extension(engine): Extension<Arc<GamificationEngine>>,
    ApiJson(request): ApiJson<SyncUserRequest>,
) -> ApiResult<User> {
    let user = engine.sync_user(&request.into()).await?;
    info!("Synced user {}", user.id);
    ok(user)
}

/// The signed-in user
#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "users",
    responses(
        (status = 200, description = "Current user"),
        (status = 401, description = "Unauthorized")
    ),
    security(("user_header" = []))
)]
pub async fn me(RequireUser(user): RequireUser) -> ApiResult<User> {
    ok(user)
}

/// Create user routes
pub fn users_routes() -> Router {
    Router::new()
        .route("/api/v1/auth/sync", post(sync_user))
        .route("/api/v1/me", get(me))
}
