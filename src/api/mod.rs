//! Web API module for Scholia
//!
//! Provides REST API endpoints for:
//! - Lesson completion and watch progress
//! - Forum posts and replies
//! - Stats, badges and leaderboards
//! - Course enrollment
//! - Notification inbox
//! - Sign-in profile sync

pub mod courses;
pub mod docs;
pub mod error;
pub mod extract;
pub mod forum;
pub mod health;
pub mod lessons;
pub mod notifications;
pub mod progress;
pub mod users;


use axum::Router;
use serde::Serialize;
use utoipa::ToSchema;

pub use courses::courses_routes;
pub use docs::docs_routes;
pub use error::ApiError;
pub use forum::forum_routes;
pub use health::health_routes;
pub use lessons::lessons_routes;
pub use notifications::notifications_routes;
pub use progress::progress_routes;
pub use users::users_routes;

/// Handler result
pub type ApiResult<T> = Result<axum::Json<ApiResponse<T>>, ApiError>;

/// Standard success envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Wrap a value in the success envelope
pub(crate) fn ok<T>(data: T) -> ApiResult<T> {
    Ok(axum::Json(ApiResponse::success(data)))
}

/// Create the API router with all endpoints
pub fn api_router() -> Router {
    Router::new()
        .merge(users_routes())
        .merge(lessons_routes())
        .merge(forum_routes())
        .merge(progress_routes())
        .merge(courses_routes())
        .merge(notifications_routes())
}
