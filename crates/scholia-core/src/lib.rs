//! # Scholia Core - Progress & Gamification Engine
//!
//! This crate turns learner activity on the Scholia platform (lesson
//! completions, watch progress, forum posts and replies) into points,
//! levels, daily streaks, badges and notifications.
//!
//! ## Key Features
//!
//! - **Idempotent rewards**: a lesson or course pays out exactly once, however often it is completed
//! - **Level curve**: quadratic thresholds (0, 100, 400, 900, ...) computed with integer math
//! - **Streaks**: consecutive UTC days with a lesson completion
//! - **Badges**: declarative catalog with a closed set of requirement types
//! - **Leaderboards**: all-time, monthly and weekly rankings from a point ledger
//!
//! ## Core Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`GamificationEngine`] | Entry point for every user action |
//! | [`Store`] | SQLite-based persistent storage |
//! | [`BadgeCatalog`] | Badge definitions and their requirements |
//! | [`Clock`] | Injected time source |
//!
//! ## Reward Pipeline
//!
//! ```text
//! Route handler
//!     │
//!     ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │  GamificationEngine                                         │
//! │  • Progress write (conditional, gates the reward)          │
//! │  • Stats delta: points, counter, streak, level, ledger     │
//! │  • Course completion check                                  │
//! └────────────────────────────────────────────────────────────┘
//!     │
//!     ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │  Badge matcher → Notification inbox                         │
//! └────────────────────────────────────────────────────────────┘
//!     │
//!     ▼
//! GamificationResult { points_awarded, new_level, new_achievements, course }
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use scholia_core::{BadgeCatalog, GamificationEngine, RewardConfig, Store};
//!
//! let store = Store::from_path(Path::new("data/scholia.db"), 5).await?;
//! store.sync_badge_catalog(&BadgeCatalog::from_toml_str(DEFAULT_BADGES)?).await?;
//!
//! let engine = GamificationEngine::new(store, RewardConfig::default());
//! let outcome = engine.complete_lesson(user_id, lesson_id).await?;
//! println!("+{} points", outcome.gamification.map_or(0, |g| g.points_awarded));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod badge;
pub mod clock;
pub mod engine;
pub mod error;
pub mod level;
pub mod notification;
pub mod rewards;
pub mod store;
pub mod streak;
pub mod types;

// Re-export main types
pub use badge::{
    Badge, BadgeBoard, BadgeCatalog, BadgeStatus, BadgeSummary, Rarity, Requirement,
    UnlockedBadge,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{
    ForumThread, GamificationEngine, LessonOutcome, NotificationPage, PostOutcome, ReplyOutcome,
    DEFAULT_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT,
};
pub use error::{Error, Result};
pub use level::{level_for, points_for_level, LevelProgress};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use rewards::{CourseCompletion, GamificationResult, PointValues, RewardConfig};
pub use store::{CourseTally, StatsDelta, StatsUpdate, Store, UserBadge};
pub use streak::Streak;
pub use types::{
    Course, Enrollment, EnrollmentStatus, ForumPost, ForumReply, LeaderboardEntry,
    LeaderboardPeriod, Lesson, LessonProgress, StatsView, User, UserProfile, UserStats,
};

/// Badge catalog shipped with the crate
pub const DEFAULT_BADGES: &str = include_str!("../../../config/badges.toml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_badges_all_load() {
        let catalog = BadgeCatalog::from_toml_str(DEFAULT_BADGES).unwrap();
        let declared = DEFAULT_BADGES.matches("[[badges]]").count();
        assert_eq!(catalog.len(), declared);
        assert!(catalog
            .badges()
            .iter()
            .any(|b| matches!(b.requirement, Requirement::MonthActivity { .. })));
    }
}
