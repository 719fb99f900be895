//! Integration tests for Scholia
//!
//! These tests drive `scholia-core` end to end against an on-disk SQLite
//! database with the built-in badge catalog:
//! - Lesson completions across several days (streaks, course bonus)
//! - Forum activity and reply notifications
//! - Leaderboards and persistence across restarts
//! - Streak-at-risk warnings

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use scholia_core::{
    BadgeCatalog, Clock, GamificationEngine, LeaderboardPeriod, ManualClock, NotificationKind,
    RewardConfig, Store, UserProfile, DEFAULT_BADGES,
};

fn profile(external_id: &str, name: &str) -> UserProfile {
    UserProfile {
        external_id: external_id.to_string(),
        name: name.to_string(),
        email: Some(format!("{name}@example.com").to_lowercase()),
        image_url: None,
    }
}

async fn open(path: &Path, clock: Arc<ManualClock>) -> GamificationEngine {
    let store = Store::from_path(path, 2).await.unwrap();
    store
        .sync_badge_catalog(&BadgeCatalog::from_toml_str(DEFAULT_BADGES).unwrap())
        .await
        .unwrap();
    GamificationEngine::new(store, RewardConfig::default()).with_clock(clock)
}

// ============================================================================
// Learning week
// ============================================================================

#[tokio::test]
async fn test_learning_week_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("scholia.db");
    // Monday
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap(),
    ));

    let engine = open(&db, clock.clone()).await;
    let alice = engine.sync_user(&profile("idp|alice", "Alice")).await.unwrap();
    let bob = engine.sync_user(&profile("idp|bob", "Bob")).await.unwrap();

    let store = engine.store();
    let course = store
        .upsert_course("rust-basics", "Rust Basics", clock.now())
        .await
        .unwrap();
    let mut lessons = Vec::new();
    for (position, title) in ["Ownership", "Borrowing", "Lifetimes"].iter().enumerate() {
        lessons.push(
            store
                .upsert_lesson(course.id, position as u32 + 1, title)
                .await
                .unwrap(),
        );
    }

    // Bob opens a thread on Monday
    let post = engine
        .create_forum_post(bob.id, "Stuck on lifetimes", "Any tips?")
        .await
        .unwrap();
    assert_eq!(post.points_awarded, 5);

    // Alice: one lesson per day
    for (day, lesson) in lessons.iter().enumerate() {
        if day > 0 {
            clock.advance(Duration::days(1));
        }
        let outcome = engine.complete_lesson(alice.id, lesson.id).await.unwrap();
        assert!(outcome.progress.is_completed);
    }

    // Wednesday: she answers Bob
    engine
        .create_forum_reply(alice.id, post.post.id, "Draw the scopes out")
        .await
        .unwrap();

    let stats = engine.get_user_stats(alice.id).await.unwrap();
    assert_eq!(stats.stats.total_points, 3 * 10 + 100 + 3);
    assert_eq!(stats.stats.level, 2);
    assert_eq!(stats.stats.current_streak, 3);
    assert_eq!(stats.stats.courses_completed, 1);

    let board = engine.get_badges(alice.id).await.unwrap();
    let unlocked: HashSet<&str> = board
        .badges
        .iter()
        .filter(|b| b.unlocked)
        .map(|b| b.badge.id.as_str())
        .collect();
    assert_eq!(
        unlocked,
        HashSet::from(["first-steps", "on-fire", "graduate", "centurion"])
    );

    let bob_inbox = engine.list_notifications(bob.id, true, None).await.unwrap();
    assert!(bob_inbox
        .notifications
        .iter()
        .any(|n| n.kind == NotificationKind::ForumReply));

    let weekly = engine
        .get_leaderboard(LeaderboardPeriod::Weekly, None)
        .await
        .unwrap();
    assert_eq!(weekly.len(), 2);
    assert_eq!(weekly[0].user_id, alice.id);
    assert_eq!(weekly[1].total_points, 5);

    // Restart: everything survives
    drop(engine);
    let engine = open(&db, clock.clone()).await;
    let stats = engine.get_user_stats(alice.id).await.unwrap();
    assert_eq!(stats.stats.total_points, 133);

    // Re-completing after restart pays nothing
    let again = engine.complete_lesson(alice.id, lessons[0].id).await.unwrap();
    assert_eq!(again.gamification.map(|g| g.points_awarded), Some(0));

    // Thursday: Alice's streak is at risk, warned once
    clock.advance(Duration::days(1));
    assert_eq!(engine.warn_streaks_at_risk().await.unwrap(), 1);
    assert_eq!(engine.warn_streaks_at_risk().await.unwrap(), 0);
}
