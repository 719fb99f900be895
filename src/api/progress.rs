//! Progress API endpoints
//!
//! GET  /api/v1/stats - Points, level, streaks and counters
//! GET  /api/v1/badges - Badge catalog with unlock state
//! POST /api/v1/badges/:id/favorite - Toggle a badge favorite
//! GET  /api/v1/leaderboard - Rankings per period

use axum::{
    routing::{get, post},
    Extension, Router,
};
use scholia_core::{BadgeBoard, GamificationEngine, LeaderboardEntry, LeaderboardPeriod, StatsView};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use super::extract::{ApiPath, ApiQuery};
use super::{ok, ApiError, ApiResult};
use crate::middleware::auth::RequireUser;

/// Query parameters for the leaderboard
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LeaderboardQuery {
    /// `all-time` (default), `monthly` or `weekly`
    pub period: Option<String>,
    /// Rows to return (default 10, max 100)
    pub limit: Option<u32>,
}

/// Leaderboard response
#[derive(Debug, Serialize)]
pub struct LeaderboardView {
    pub period: LeaderboardPeriod,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Favorite toggle response
#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteView {
    pub badge_id: String,
    pub is_favorite: bool,
}

/// Current user's stats with level progress
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "progress",
    responses(
        (status = 200, description = "Stats and level progress"),
        (status = 401, description = "Unauthorized")
    ),
    security(("user_header" = []))
)]
pub async fn get_stats(
    RequireUser(user): RequireUser,
    Extension(engine): Extension<Arc<GamificationEngine>>,
) -> ApiResult<StatsView> {
    ok(engine.get_user_stats(user.id).await?)
}

/// Badge catalog annotated with the user's unlocks
#[utoipa::path(
    get,
    path = "/api/v1/badges",
    tag = "progress",
    responses(
        (status = 200, description = "Badges with unlock state and totals"),
        (status = 401, description = "Unauthorized")
    ),
    security(("user_header" = []))
)]
pub async fn get_badges(
    RequireUser(user): RequireUser,
    Extension(engine): Extension<Arc<GamificationEngine>>,
) -> ApiResult<BadgeBoard> {
    ok(engine.get_badges(user.id).await?)
}

/// Pin or unpin an unlocked badge
#[utoipa::path(
    post,
    path = "/api/v1/badges/{id}/favorite",
    tag = "progress",
    params(
        ("id" = String, Path, description = "Badge ID")
    ),
    responses(
        (status = 200, description = "New favorite flag", body = FavoriteView),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Badge not unlocked")
    ),
    security(("user_header" = []))
)]
pub async fn toggle_favorite(
    RequireUser(user): RequireUser,
    Extension(engine): Extension<Arc<GamificationEngine>>,
    ApiPath(badge_id): ApiPath<String>,
) -> ApiResult<FavoriteView> {
    let is_favorite = engine.toggle_favorite_badge(user.id, &badge_id).await?;
    ok(FavoriteView {
        badge_id,
        is_favorite,
    })
}

/// Leaderboard for a period
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    tag = "progress",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Ranked users"),
        (status = 400, description = "Unknown period"),
        (status = 401, description = "Unauthorized")
    ),
    security(("user_header" = []))
)]
pub async fn get_leaderboard(
    RequireUser(_user): RequireUser,
    Extension(engine): Extension<Arc<GamificationEngine>>,
    ApiQuery(query): ApiQuery<LeaderboardQuery>,
) -> ApiResult<LeaderboardView> {
    let period = match query.period.as_deref() {
        None | Some("") => LeaderboardPeriod::default(),
        Some(raw) => raw.parse().map_err(ApiError::bad_request)?,
    };
    let leaderboard = engine.get_leaderboard(period, query.limit).await?;
    ok(LeaderboardView {
        period,
        leaderboard,
    })
}

/// Create progress routes
pub fn progress_routes() -> Router {
    Router::new()
        .route("/api/v1/stats", get(get_stats))
        .route("/api/v1/badges", get(get_badges))
        .route("/api/v1/badges/:id/favorite", post(toggle_favorite))
        .route("/api/v1/leaderboard", get(get_leaderboard))
}
