use super::{StatsDelta, Store};
use crate::badge::BadgeCatalog;
use crate::notification::{NewNotification, NotificationKind};
use crate::types::{Counter, EnrollmentStatus, PointReason, User, UserProfile};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

async fn create_test_store() -> Store {
    Store::in_memory().await.unwrap()
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
}

async fn create_user(store: &Store, external_id: &str, at: DateTime<Utc>) -> User {
    let profile = UserProfile {
        external_id: external_id.to_string(),
        name: format!("User {external_id}"),
        email: None,
        image_url: None,
    };
    store.upsert_user(&profile, at).await.unwrap()
}

#[tokio::test]
async fn test_upsert_user_is_stable_and_creates_stats() {
    let store = create_test_store().await;
    let first = create_user(&store, "idp|1", t0()).await;

    let refreshed = store
        .upsert_user(
            &UserProfile {
                external_id: "idp|1".to_string(),
                name: "Renamed".to_string(),
                email: Some("a@example.com".to_string()),
                image_url: None,
            },
            t0() + Duration::hours(1),
        )
        .await
        .unwrap();

    assert_eq!(refreshed.id, first.id);
    assert_eq!(refreshed.name, "Renamed");
    assert_eq!(refreshed.created_at, first.created_at);

    let stats = store.get_user_stats(first.id).await.unwrap();
    assert_eq!(stats.total_points, 0);
    assert_eq!(stats.level, 1);

    let found = store.find_user_by_external_id("idp|1").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(first.id));
    assert!(store.find_user_by_external_id("idp|2").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_missing_user() {
    let store = create_test_store().await;
    let err = store.get_user(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_mark_lesson_completed_only_once() {
    let store = create_test_store().await;
    let user = create_user(&store, "idp|1", t0()).await;
    let course = store.upsert_course("rust", "Rust", t0()).await.unwrap();
    let lesson = store.upsert_lesson(course.id, 1, "Intro").await.unwrap();

    let (progress, newly) = store
        .mark_lesson_completed(user.id, lesson.id, t0())
        .await
        .unwrap();
    assert!(newly);
    assert!(progress.is_completed);
    assert_eq!(progress.completed_at, Some(t0()));

    let (again, newly) = store
        .mark_lesson_completed(user.id, lesson.id, t0() + Duration::minutes(5))
        .await
        .unwrap();
    assert!(!newly);
    assert_eq!(again.completed_at, Some(t0()));
}

#[tokio::test]
async fn test_record_watch_never_decreases() {
    let store = create_test_store().await;
    let user = create_user(&store, "idp|1", t0()).await;
    let course = store.upsert_course("rust", "Rust", t0()).await.unwrap();
    let lesson = store.upsert_lesson(course.id, 1, "Intro").await.unwrap();

    store
        .record_watch(user.id, lesson.id, 120, 55.0, t0())
        .await
        .unwrap();
    let progress = store
        .record_watch(user.id, lesson.id, 30, 20.0, t0())
        .await
        .unwrap();

    assert_eq!(progress.watch_percentage, 55.0);
    assert_eq!(progress.watch_time_secs, 120);
    assert!(!progress.is_completed);
}

#[tokio::test]
async fn test_course_tally_and_enrollment_flip() {
    let store = create_test_store().await;
    let user = create_user(&store, "idp|1", t0()).await;
    let course = store.upsert_course("rust", "Rust", t0()).await.unwrap();
    let l1 = store.upsert_lesson(course.id, 1, "One").await.unwrap();
    store.upsert_lesson(course.id, 2, "Two").await.unwrap();

    store.ensure_enrollment(user.id, course.id, t0()).await.unwrap();
    store.mark_lesson_completed(user.id, l1.id, t0()).await.unwrap();

    let tally = store.course_tally(user.id, course.id).await.unwrap();
    assert_eq!(tally.completed, 1);
    assert_eq!(tally.total, 2);
    assert_eq!(tally.percent(), 50.0);
    assert!(!tally.is_complete());

    store
        .raise_enrollment_progress(user.id, course.id, 50.0)
        .await
        .unwrap();
    store
        .raise_enrollment_progress(user.id, course.id, 10.0)
        .await
        .unwrap();
    let enrollment = store.get_enrollment(user.id, course.id).await.unwrap().unwrap();
    assert_eq!(enrollment.progress_percent, 50.0);

    assert!(store.complete_enrollment(user.id, course.id, t0()).await.unwrap());
    assert!(!store.complete_enrollment(user.id, course.id, t0()).await.unwrap());

    let enrollment = store.get_enrollment(user.id, course.id).await.unwrap().unwrap();
    assert_eq!(enrollment.status, EnrollmentStatus::Completed);
    assert_eq!(enrollment.progress_percent, 100.0);
}

#[tokio::test]
async fn test_upsert_lesson_keeps_id_per_position() {
    let store = create_test_store().await;
    let course = store.upsert_course("rust", "Rust", t0()).await.unwrap();
    let first = store.upsert_lesson(course.id, 1, "Intro").await.unwrap();
    let renamed = store.upsert_lesson(course.id, 1, "Welcome").await.unwrap();

    assert_eq!(first.id, renamed.id);
    assert_eq!(renamed.title, "Welcome");
    assert_eq!(store.list_lessons(course.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_apply_stats_delta_increments_and_levels() {
    let store = create_test_store().await;
    let user = create_user(&store, "idp|1", t0()).await;
    let day = t0().date_naive();

    let update = store
        .apply_stats_delta(
            user.id,
            &StatsDelta::points(90, PointReason::LessonCompleted)
                .with_counter(Counter::LessonsCompleted)
                .with_activity(day),
            t0(),
        )
        .await
        .unwrap();
    assert_eq!(update.stats.total_points, 90);
    assert_eq!(update.stats.lessons_completed, 1);
    assert_eq!(update.stats.current_streak, 1);
    assert_eq!(update.level_up(), None);

    let update = store
        .apply_stats_delta(
            user.id,
            &StatsDelta::points(10, PointReason::ForumPost).with_counter(Counter::ForumPosts),
            t0(),
        )
        .await
        .unwrap();
    assert_eq!(update.stats.total_points, 100);
    assert_eq!(update.previous_level, 1);
    assert_eq!(update.level_up(), Some(2));
    assert_eq!(update.stats.forum_posts, 1);

    let stored = store.get_user_stats(user.id).await.unwrap();
    assert_eq!(stored, update.stats);
}

#[tokio::test]
async fn test_apply_stats_delta_unknown_user() {
    let store = create_test_store().await;
    let err = store
        .apply_stats_delta(
            Uuid::new_v4(),
            &StatsDelta::points(10, PointReason::ForumPost),
            t0(),
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_streaks_at_risk() {
    let store = create_test_store().await;
    let active = create_user(&store, "idp|1", t0()).await;
    let lapsed = create_user(&store, "idp|2", t0()).await;
    let yesterday = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
    let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

    let delta = StatsDelta::points(10, PointReason::LessonCompleted);
    store
        .apply_stats_delta(active.id, &delta.clone().with_activity(yesterday), t0())
        .await
        .unwrap();
    store
        .apply_stats_delta(
            lapsed.id,
            &delta.with_activity(yesterday - Duration::days(3)),
            t0(),
        )
        .await
        .unwrap();

    let at_risk = store.list_streaks_at_risk(today).await.unwrap();
    assert_eq!(at_risk.len(), 1);
    assert_eq!(at_risk[0].user_id, active.id);
}

#[tokio::test]
async fn test_badge_catalog_sync_and_unlock() {
    let store = create_test_store().await;
    let user = create_user(&store, "idp|1", t0()).await;
    let catalog = BadgeCatalog::from_toml_str(
        r#"
        [[badges]]
        id = "first-steps"
        name = "First Steps"
        description = "Complete a lesson"
        category = "learning"
        requirement = { type = "lessons_completed", count = 1 }

        [[badges]]
        id = "centurion"
        name = "Centurion"
        description = "Earn 100 points"
        category = "learning"
        rarity = "rare"
        requirement = { type = "total_points", count = 100 }
        "#,
    )
    .unwrap();

    store.sync_badge_catalog(&catalog).await.unwrap();
    store.sync_badge_catalog(&catalog).await.unwrap();

    let loaded = store.load_badges().await.unwrap();
    assert_eq!(loaded, catalog);

    assert!(store.unlock_badge(user.id, "first-steps", t0()).await.unwrap());
    assert!(!store.unlock_badge(user.id, "first-steps", t0()).await.unwrap());

    let held = store.list_user_badges(user.id).await.unwrap();
    assert_eq!(held.len(), 1);
    assert!(!held[0].is_favorite);

    assert!(store.toggle_favorite(user.id, "first-steps").await.unwrap());
    assert!(!store.toggle_favorite(user.id, "first-steps").await.unwrap());
    assert!(store
        .toggle_favorite(user.id, "centurion")
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_load_badges_skips_unknown_requirement() {
    let store = create_test_store().await;
    sqlx::query(
        r#"
        INSERT INTO badges (id, name, description, category, requirement)
        VALUES ('odd', 'Odd', 'Legacy row', 'legacy', '{"type":"quiz_master","count":3}')
        "#,
    )
    .execute(store.pool())
    .await
    .unwrap();

    assert!(store.load_badges().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_notification_inbox() {
    let store = create_test_store().await;
    let user = create_user(&store, "idp|1", t0()).await;
    let other = create_user(&store, "idp|2", t0()).await;

    let first = store
        .create_notification(user.id, &NewNotification::level_up(2), t0())
        .await
        .unwrap();
    store
        .create_notification(
            user.id,
            &NewNotification::streak_at_risk(3),
            t0() + Duration::minutes(1),
        )
        .await
        .unwrap();

    let all = store.list_notifications(user.id, false, 50).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].kind, NotificationKind::StreakAtRisk);
    assert_eq!(store.unread_count(user.id).await.unwrap(), 2);

    assert!(store
        .mark_notification_read(other.id, first.id)
        .await
        .unwrap_err()
        .is_not_found());
    store.mark_notification_read(user.id, first.id).await.unwrap();

    let unread = store.list_notifications(user.id, true, 50).await.unwrap();
    assert_eq!(unread.len(), 1);

    assert_eq!(store.mark_all_notifications_read(user.id).await.unwrap(), 1);
    assert_eq!(store.unread_count(user.id).await.unwrap(), 0);

    assert!(store
        .has_notification_since(user.id, NotificationKind::StreakAtRisk, t0())
        .await
        .unwrap());
    assert!(!store
        .has_notification_since(user.id, NotificationKind::StreakAtRisk, t0() + Duration::hours(1))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_forum_post_and_reply() {
    let store = create_test_store().await;
    let user = create_user(&store, "idp|1", t0()).await;

    let post = store
        .create_post(user.id, "Lifetimes", "How do they work?", t0())
        .await
        .unwrap();
    let fetched = store.get_post(post.id).await.unwrap();
    assert_eq!(fetched, post);

    store
        .create_reply(post.id, user.id, "Like this", t0())
        .await
        .unwrap();
    assert_eq!(store.list_replies(post.id).await.unwrap().len(), 1);

    assert!(store.get_post(Uuid::new_v4()).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_leaderboard_all_time_and_window() {
    let store = create_test_store().await;
    let early = create_user(&store, "idp|early", t0()).await;
    let late = create_user(&store, "idp|late", t0() + Duration::minutes(1)).await;
    let idle = create_user(&store, "idp|idle", t0() + Duration::minutes(2)).await;

    let old = t0() - Duration::days(40);
    store
        .apply_stats_delta(early.id, &StatsDelta::points(50, PointReason::LessonCompleted), old)
        .await
        .unwrap();
    store
        .apply_stats_delta(late.id, &StatsDelta::points(30, PointReason::LessonCompleted), t0())
        .await
        .unwrap();
    store
        .apply_stats_delta(early.id, &StatsDelta::points(30, PointReason::ForumPost), t0())
        .await
        .unwrap();

    let all_time = store.leaderboard(None, 10).await.unwrap();
    assert_eq!(all_time.len(), 3);
    assert_eq!(all_time[0].user_id, early.id);
    assert_eq!(all_time[0].total_points, 80);
    assert_eq!(all_time[2].user_id, idle.id);
    assert_eq!(all_time[2].rank, 3);

    let window = store
        .leaderboard(Some(t0() - Duration::days(1)), 10)
        .await
        .unwrap();
    assert_eq!(window.len(), 2);
    // equal window points: earlier account ranks first
    assert_eq!(window[0].user_id, early.id);
    assert_eq!(window[0].total_points, 30);
    assert_eq!(window[1].user_id, late.id);

    let top = store.leaderboard(None, 1).await.unwrap();
    assert_eq!(top.len(), 1);
}

#[tokio::test]
async fn test_from_path_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("scholia.db");

    let store = Store::from_path(&path, 2).await.unwrap();
    store.ping().await.unwrap();
    assert!(path.exists());
}
