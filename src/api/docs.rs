//! API Documentation - Swagger UI
//!
//! Provides OpenAPI documentation at /docs

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::{
    forum::{CreatePostRequest, CreateReplyRequest},
    lessons::WatchProgressRequest,
    notifications::{MarkedRead, NotificationsQuery},
    progress::{FavoriteView, LeaderboardQuery},
    users::SyncUserRequest,
};

/// Scholia API OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Scholia API",
        version = "1.0.0",
        description = "Progress tracking and gamification REST API.

## Overview
- **Lessons**: completion and watch progress, rewarded once per lesson
- **Forum**: posts and replies earn points; threads list replies in order
- **Progress**: stats, levels, badges and leaderboards
- **Courses**: enrollment and course completion
- **Notifications**: the in-app inbox

## Authentication
The gateway identifies the user with the identity provider's id:
```
X-User-Id: <external_id>
```
Users are created by `POST /api/v1/auth/sync` on sign-in.
",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Users
        crate::api::users::sync_user,
        crate::api::users::me,
        // Lessons
        crate::api::lessons::complete_lesson,
        crate::api::lessons::update_progress,
        // Forum
        crate::api::forum::create_post,
        crate::api::forum::get_thread,
        crate::api::forum::create_reply,
        // Progress
        crate::api::progress::get_stats,
        crate::api::progress::get_badges,
        crate::api::progress::toggle_favorite,
        crate::api::progress::get_leaderboard,
        // Courses
        crate::api::courses::enroll,
        crate::api::courses::list_enrollments,
        // Notifications
        crate::api::notifications::list_notifications,
        crate::api::notifications::mark_read,
        crate::api::notifications::mark_all_read,
    ),
    components(
        schemas(
            SyncUserRequest,
            WatchProgressRequest,
            CreatePostRequest,
            CreateReplyRequest,
            LeaderboardQuery,
            FavoriteView,
            NotificationsQuery,
            MarkedRead,
        )
    ),
    tags(
        (name = "users", description = "Sign-in sync and identity"),
        (name = "lessons", description = "Lesson completion and watch progress"),
        (name = "forum", description = "Forum posts and replies"),
        (name = "progress", description = "Stats, badges and leaderboards"),
        (name = "courses", description = "Course enrollment"),
        (name = "notifications", description = "Notification inbox"),
    )
)]
pub struct ApiDoc;

/// Create documentation routes
pub fn docs_routes() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api/openapi.json", ApiDoc::openapi()))
}
