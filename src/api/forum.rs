//! Forum API endpoints
//!
//! POST /api/v1/forum/posts - Create a post
//! GET  /api/v1/forum/posts/:id - A post with its replies
//! POST /api/v1/forum/posts/:id/replies - Reply to a post

use axum::{
    routing::{get, post},
    Extension, Router,
};
use scholia_core::{ForumThread, GamificationEngine, PostOutcome, ReplyOutcome};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath};
use super::{ok, ApiResult};
use crate::middleware::auth::RequireUser;

/// New forum post
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// New forum reply
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReplyRequest {
    pub content: String,
}

/// Create a forum post
#[utoipa::path(
    post,
    path = "/api/v1/forum/posts",
    tag = "forum",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Created post with points awarded"),
        (status = 400, description = "Empty title or content"),
        (status = 401, description = "Unauthorized")
    ),
    security(("user_header" = []))
)]
pub async fn create_post(
    RequireUser(user): RequireUser,
    Extension(engine): Extension<Arc<GamificationEngine>>,
    ApiJson(request): ApiJson<CreatePostRequest>,
) -> ApiResult<PostOutcome> {
    ok(engine
        .create_forum_post(user.id, &request.title, &request.content)
        .await?)
}

/// Read a thread
#[utoipa::path(
    get,
    path = "/api/v1/forum/posts/{id}",
    tag = "forum",
    params(
        ("id" = Uuid, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post and replies, oldest reply first"),
        (status = 400, description = "Malformed post ID"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found")
    ),
    security(("user_header" = []))
)]
pub async fn get_thread(
    RequireUser(_user): RequireUser,
    Extension(engine): Extension<Arc<GamificationEngine>>,
    ApiPath(post_id): ApiPath<Uuid>,
) -> ApiResult<ForumThread> {
    ok(engine.get_forum_thread(post_id).await?)
}

/// Reply to a forum post; the post author is notified
#[utoipa::path(
    post,
    path = "/api/v1/forum/posts/{id}/replies",
    tag = "forum",
    params(
        ("id" = Uuid, Path, description = "Post ID")
    ),
    request_body = CreateReplyRequest,
    responses(
        (status = 200, description = "Created reply with points awarded"),
        (status = 400, description = "Empty content"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found")
    ),
    security(("user_header" = []))
)]
pub async fn create_reply(
    RequireUser(user): RequireUser,
    Extension(engine): Extension<Arc<GamificationEngine>>,
    ApiPath(post_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<CreateReplyRequest>,
) -> ApiResult<ReplyOutcome> {
    ok(engine
        .create_forum_reply(user.id, post_id, &request.content)
        .await?)
}

/// Create forum routes
pub fn forum_routes() -> Router {
    Router::new()
        .route("/api/v1/forum/posts", post(create_post))
        .route("/api/v1/forum/posts/:id", get(get_thread))
        .route("/api/v1/forum/posts/:id/replies", post(create_reply))
}
