use std::collections::HashMap;

use chrono::NaiveTime;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::GamificationEngine;
use crate::badge::{BadgeBoard, BadgeStatus};
use crate::error::Result;
use crate::level::LevelProgress;
use crate::notification::{NewNotification, Notification, NotificationKind};
use crate::types::{LeaderboardEntry, LeaderboardPeriod, StatsView};

/// Rows returned when no limit is given
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;
/// Upper bound for a requested limit
pub const MAX_LEADERBOARD_LIMIT: u32 = 100;

const MAX_NOTIFICATIONS: u32 = 100;

/// A slice of the inbox plus the unread total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPage {
    /// Most recent first
    pub notifications: Vec<Notification>,
    /// Unread notifications overall, not just in this page
    pub unread_count: u32,
}

impl GamificationEngine {
    /// Stats with level progress
    #[instrument(skip(self))]
    pub async fn get_user_stats(&self, user_id: Uuid) -> Result<StatsView> {
        let stats = self.store.get_user_stats(user_id).await?;
        let level_progress = LevelProgress::for_points(stats.total_points);
        Ok(StatsView {
            stats,
            level_progress,
        })
    }

    /// Whole catalog annotated with the user's unlocks
    #[instrument(skip(self))]
    pub async fn get_badges(&self, user_id: Uuid) -> Result<BadgeBoard> {
        self.store.get_user(user_id).await?;
        let catalog = self.store.load_badges().await?;
        let held: HashMap<String, _> = self
            .store
            .list_user_badges(user_id)
            .await?
            .into_iter()
            .map(|b| (b.badge_id.clone(), b))
            .collect();

        let badges = catalog
            .badges()
            .iter()
            .map(|badge| {
                let unlock = held.get(&badge.id);
                BadgeStatus {
                    badge: badge.clone(),
                    unlocked: unlock.is_some(),
                    unlocked_at: unlock.map(|u| u.unlocked_at),
                    is_favorite: unlock.is_some_and(|u| u.is_favorite),
                }
            })
            .collect();

        Ok(BadgeBoard::new(badges))
    }

    /// Pin or unpin an unlocked badge; returns the new flag
    #[instrument(skip(self))]
    pub async fn toggle_favorite_badge(&self, user_id: Uuid, badge_id: &str) -> Result<bool> {
        self.store.toggle_favorite(user_id, badge_id).await
    }

    /// Ranking for a period. `limit` defaults to 10 and is clamped to 1..=100.
    #[instrument(skip(self))]
    pub async fn get_leaderboard(
        &self,
        period: LeaderboardPeriod,
        limit: Option<u32>,
    ) -> Result<Vec<LeaderboardEntry>> {
        let limit = limit
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
            .clamp(1, MAX_LEADERBOARD_LIMIT);
        let since = period.window_start(self.now());
        self.store.leaderboard(since, limit).await
    }

    /// Inbox page, newest first
    #[instrument(skip(self))]
    pub async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: Option<u32>,
    ) -> Result<NotificationPage> {
        let limit = limit.unwrap_or(MAX_NOTIFICATIONS).clamp(1, MAX_NOTIFICATIONS);
        let notifications = self
            .store
            .list_notifications(user_id, unread_only, limit)
            .await?;
        let unread_count = self.store.unread_count(user_id).await?;
        Ok(NotificationPage {
            notifications,
            unread_count,
        })
    }

    /// Mark one notification read
    #[instrument(skip(self))]
    pub async fn mark_notification_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<()> {
        self.store
            .mark_notification_read(user_id, notification_id)
            .await
    }

    /// Mark the whole inbox read; returns how many changed
    #[instrument(skip(self))]
    pub async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64> {
        self.store.mark_all_notifications_read(user_id).await
    }

    /// Warn every user whose streak lapses tonight. At most one warning per
    /// user per UTC day; returns how many were sent.
    #[instrument(skip(self))]
    pub async fn warn_streaks_at_risk(&self) -> Result<usize> {
        let now = self.now();
        let today = now.date_naive();
        let start_of_day = today.and_time(NaiveTime::MIN).and_utc();

        let mut sent = 0;
        for stats in self.store.list_streaks_at_risk(today).await? {
            if self
                .store
                .has_notification_since(stats.user_id, NotificationKind::StreakAtRisk, start_of_day)
                .await?
            {
                continue;
            }
            self.notify(
                stats.user_id,
                NewNotification::streak_at_risk(stats.current_streak),
                now,
            )
            .await?;
            sent += 1;
        }

        info!("Sent {sent} streak warnings");
        Ok(sent)
    }
}
