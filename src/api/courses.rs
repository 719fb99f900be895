//! Course API endpoints
//!
//! POST /api/v1/courses/:id/enroll - Enroll in a course
//! GET  /api/v1/enrollments - List the user's enrollments

use axum::{
    routing::{get, post},
    Extension, Router,
};
use scholia_core::{Enrollment, GamificationEngine};
use std::sync::Arc;
use uuid::Uuid;

use super::extract::ApiPath;
use super::{ok, ApiResult};
use crate::middleware::auth::RequireUser;

/// Enroll in a course (idempotent)
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/enroll",
    tag = "courses",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Enrollment"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Course not found")
    ),
    security(("user_header" = []))
)]
pub async fn enroll(
    RequireUser(user): RequireUser,
    Extension(engine): Extension<Arc<GamificationEngine>>,
    ApiPath(course_id): ApiPath<Uuid>,
) -> ApiResult<Enrollment> {
    ok(engine.enroll(user.id, course_id).await?)
}

/// Enrollments with progress
#[utoipa::path(
    get,
    path = "/api/v1/enrollments",
    tag = "courses",
    responses(
        (status = 200, description = "Enrollments, most recent first"),
        (status = 401, description = "Unauthorized")
    ),
    security(("user_header" = []))
)]
pub async fn list_enrollments(
    RequireUser(user): RequireUser,
    Extension(engine): Extension<Arc<GamificationEngine>>,
) -> ApiResult<Vec<Enrollment>> {
    ok(engine.list_enrollments(user.id).await?)
}

/// Create course routes
pub fn courses_routes() -> Router {
    Router::new()
        .route("/api/v1/courses/:id/enroll", post(enroll))
        .route("/api/v1/enrollments", get(list_enrollments))
}
