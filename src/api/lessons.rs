//! Lesson API endpoints
//!
//! POST /api/v1/lessons/:id/complete - Complete a lesson
//! POST /api/v1/lessons/:id/progress - Record watch progress

use axum::{routing::post, Extension, Router};
use scholia_core::{GamificationEngine, LessonOutcome};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath};
use super::{ok, ApiResult};
use crate::middleware::auth::RequireUser;

/// Watch progress ping
#[derive(Debug, Deserialize, ToSchema)]
pub struct WatchProgressRequest {
    /// Seconds watched so far
    #[serde(default)]
    pub watch_time: u32,
    /// Percentage of the video watched (0-100)
    pub watch_percentage: f64,
}

/// Complete a lesson; rewards are granted on the first completion only
#[utoipa::path(
    post,
    path = "/api/v1/lessons/{id}/complete",
    tag = "lessons",
    params(
        ("id" = Uuid, Path, description = "Lesson ID")
    ),
    responses(
        (status = 200, description = "Lesson progress and gamification result"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lesson not found"),
        (status = 500, description = "Completion recorded but rewards failed")
    ),
    security(("user_header" = []))
)]
pub async fn complete_lesson(
    RequireUser(user): RequireUser,
    Extension(engine): Extension<Arc<GamificationEngine>>,
    ApiPath(lesson_id): ApiPath<Uuid>,
) -> ApiResult<LessonOutcome> {
    ok(engine.complete_lesson(user.id, lesson_id).await?)
}

/// Record watch progress; completes the lesson at the configured threshold
#[utoipa::path(
    post,
    path = "/api/v1/lessons/{id}/progress",
    tag = "lessons",
    params(
        ("id" = Uuid, Path, description = "Lesson ID")
    ),
    request_body = WatchProgressRequest,
    responses(
        (status = 200, description = "Lesson progress, plus gamification when this ping completed the lesson"),
        (status = 400, description = "watch_percentage outside 0-100"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lesson not found")
    ),
    security(("user_header" = []))
)]
pub async fn update_progress(
    RequireUser(user): RequireUser,
    Extension(engine): Extension<Arc<GamificationEngine>>,
    ApiPath(lesson_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<WatchProgressRequest>,
) -> ApiResult<LessonOutcome> {
    ok(engine
        .update_lesson_watch(
            user.id,
            lesson_id,
            request.watch_time,
            request.watch_percentage,
        )
        .await?)
}

/// Create lesson routes
pub fn lessons_routes() -> Router {
    Router::new()
        .route("/api/v1/lessons/:id/complete", post(complete_lesson))
        .route("/api/v1/lessons/:id/progress", post(update_progress))
}
