//! Event dispatcher
//!
//! Route handlers call into [`GamificationEngine`], which runs the whole
//! reward pipeline for one user action: progress store, stats aggregate,
//! level curve, badge matcher and notification sink, in that order.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::badge::UnlockedBadge;
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::notification::NewNotification;
use crate::rewards::{GamificationResult, RewardConfig};
use crate::store::{StatsDelta, Store};
use crate::types::{Enrollment, User, UserProfile, UserStats};

mod forum;
mod lessons;
mod queries;


pub use forum::{ForumThread, PostOutcome, ReplyOutcome};
pub use lessons::LessonOutcome;
pub use queries::{NotificationPage, DEFAULT_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT};

/// Gamification engine shared by all request handlers
pub struct GamificationEngine {
    store: Store,
    rewards: RewardConfig,
    clock: Arc<dyn Clock>,
}

impl GamificationEngine {
    /// Create an engine on the wall clock
    pub fn new(store: Store, rewards: RewardConfig) -> Self {
        Self {
            store,
            rewards,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Underlying store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Active reward rules
    pub fn rewards(&self) -> &RewardConfig {
        &self.rewards
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Create or refresh a user from sign-in data
    #[instrument(skip(self, profile), fields(external_id = %profile.external_id))]
    pub async fn sync_user(&self, profile: &UserProfile) -> Result<User> {
        if profile.external_id.trim().is_empty() {
            return Err(Error::Validation("external_id is required".to_string()));
        }
        self.store.upsert_user(profile, self.now()).await
    }

    /// Enroll in a course; re-enrolling returns the existing enrollment
    #[instrument(skip(self))]
    pub async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> Result<Enrollment> {
        self.store.get_user(user_id).await?;
        self.store.get_course(course_id).await?;

        let enrollment = self
            .store
            .ensure_enrollment(user_id, course_id, self.now())
            .await?;
        info!("User {user_id} enrolled in course {course_id}");
        Ok(enrollment)
    }

    /// Enrollments of a user
    #[instrument(skip(self))]
    pub async fn list_enrollments(&self, user_id: Uuid) -> Result<Vec<Enrollment>> {
        self.store.get_user(user_id).await?;
        self.store.list_enrollments(user_id).await
    }

    /// Apply a stats delta and run everything that hangs off it: point and
    /// level-up notifications, then the badge matcher.
    async fn award(
        &self,
        user_id: Uuid,
        delta: StatsDelta,
        action: &str,
        now: DateTime<Utc>,
    ) -> Result<GamificationResult> {
        let update = self.store.apply_stats_delta(user_id, &delta, now).await?;

        if self.rewards.notify_points && delta.points > 0 {
            self.notify(user_id, NewNotification::points_earned(delta.points, action), now)
                .await?;
        }

        let new_level = update.level_up();
        if let Some(level) = new_level {
            info!("User {user_id} reached level {level}");
            self.notify(user_id, NewNotification::level_up(level), now)
                .await?;
        }

        let mut result = GamificationResult::points(delta.points, new_level);
        result.new_achievements = self.evaluate_badges(&update.stats, now).await?;
        Ok(result)
    }

    /// Unlock every catalog badge the stats now satisfy.
    ///
    /// Only inserts that actually created a row are reported and notified,
    /// so concurrent evaluations never double-unlock.
    async fn evaluate_badges(
        &self,
        stats: &UserStats,
        now: DateTime<Utc>,
    ) -> Result<Vec<UnlockedBadge>> {
        let catalog = self.store.load_badges().await?;
        let held: HashSet<String> = self
            .store
            .list_user_badges(stats.user_id)
            .await?
            .into_iter()
            .map(|b| b.badge_id)
            .collect();

        let mut unlocked = Vec::new();
        for badge in catalog.badges() {
            if held.contains(&badge.id) || !badge.requirement.is_met(stats, now) {
                continue;
            }
            if !self.store.unlock_badge(stats.user_id, &badge.id, now).await? {
                debug!("Badge {} already unlocked concurrently", badge.id);
                continue;
            }

            let entry = UnlockedBadge::from_badge(badge, now);
            info!("User {} unlocked badge {}", stats.user_id, badge.id);
            self.notify(stats.user_id, NewNotification::badge_unlocked(&entry), now)
                .await?;
            unlocked.push(entry);
        }

        Ok(unlocked)
    }

    async fn notify(
        &self,
        user_id: Uuid,
        notification: NewNotification,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.store
            .create_notification(user_id, &notification, now)
            .await
            .map(|_| ())
            .inspect_err(|e| warn!("Failed to notify {user_id}: {e}"))
    }
}
