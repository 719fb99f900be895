//! Notification API endpoints
//!
//! GET  /api/v1/notifications - Inbox, newest first, with unread count
//! POST /api/v1/notifications/:id/read - Mark one read
//! POST /api/v1/notifications/read-all - Mark all read

use axum::{
    routing::{get, post},
    Extension, Router,
};
use scholia_core::{GamificationEngine, NotificationPage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::extract::{ApiPath, ApiQuery};
use super::{ok, ApiResult};
use crate::middleware::auth::RequireUser;

/// Query parameters for the inbox
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct NotificationsQuery {
    /// Only unread notifications
    #[serde(default)]
    pub unread: bool,
    /// Maximum number of results (max 100)
    pub limit: Option<u32>,
}

/// Result of a read-all
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkedRead {
    pub updated: u64,
}

/// List notifications
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    tag = "notifications",
    params(NotificationsQuery),
    responses(
        (status = 200, description = "Notifications and unread count"),
        (status = 401, description = "Unauthorized")
    ),
    security(("user_header" = []))
)]
pub async fn list_notifications(
    RequireUser(user): RequireUser,
    Extension(engine): Extension<Arc<GamificationEngine>>,
    ApiQuery(query): ApiQuery<NotificationsQuery>,
) -> ApiResult<NotificationPage> {
    ok(engine
        .list_notifications(user.id, query.unread, query.limit)
        .await?)
}

/// Mark a notification read
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    tag = "notifications",
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Marked read"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Notification not found")
    ),
    security(("user_header" = []))
)]
pub async fn mark_read(
    RequireUser(user): RequireUser,
    Extension(engine): Extension<Arc<GamificationEngine>>,
    ApiPath(notification_id): ApiPath<Uuid>,
) -> ApiResult<()> {
    engine
        .mark_notification_read(user.id, notification_id)
        .await?;
    ok(())
}

/// Mark every notification read
#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    tag = "notifications",
    responses(
        (status = 200, description = "Number of notifications marked read", body = MarkedRead),
        (status = 401, description = "Unauthorized")
    ),
    security(("user_header" = []))
)]
pub async fn mark_all_read(
    RequireUser(user): RequireUser,
    Extension(engine): Extension<Arc<GamificationEngine>>,
) -> ApiResult<MarkedRead> {
    let updated = engine.mark_all_notifications_read(user.id).await?;
    ok(MarkedRead { updated })
}

/// Create notification routes
pub fn notifications_routes() -> Router {
    Router::new()
        .route("/api/v1/notifications", get(list_notifications))
        .route("/api/v1/notifications/read-all", post(mark_all_read))
        .route("/api/v1/notifications/:id/read", post(mark_read))
}
