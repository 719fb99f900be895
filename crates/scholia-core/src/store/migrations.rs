use super::Store;
use crate::error::Result;
use tracing::debug;

const SCHEMA: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            external_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            email TEXT,
            image_url TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "user_stats",
        r#"
        CREATE TABLE IF NOT EXISTS user_stats (
            user_id TEXT PRIMARY KEY,
            total_points INTEGER NOT NULL DEFAULT 0,
            level INTEGER NOT NULL DEFAULT 1,
            current_streak INTEGER NOT NULL DEFAULT 0,
            longest_streak INTEGER NOT NULL DEFAULT 0,
            last_activity_date TEXT,
            courses_completed INTEGER NOT NULL DEFAULT 0,
            lessons_completed INTEGER NOT NULL DEFAULT 0,
            forum_posts INTEGER NOT NULL DEFAULT 0,
            forum_replies INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL,

            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "courses",
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "lessons",
        r#"
        CREATE TABLE IF NOT EXISTS lessons (
            id TEXT PRIMARY KEY,
            course_id TEXT NOT NULL,
            title TEXT NOT NULL,
            position INTEGER NOT NULL,

            UNIQUE (course_id, position),
            FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "lesson_progress",
        r#"
        CREATE TABLE IF NOT EXISTS lesson_progress (
            user_id TEXT NOT NULL,
            lesson_id TEXT NOT NULL,
            is_completed INTEGER NOT NULL DEFAULT 0,
            completed_at TEXT,
            watch_percentage REAL NOT NULL DEFAULT 0,
            watch_time_secs INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,

            PRIMARY KEY (user_id, lesson_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (lesson_id) REFERENCES lessons(id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "enrollments",
        r#"
        CREATE TABLE IF NOT EXISTS enrollments (
            user_id TEXT NOT NULL,
            course_id TEXT NOT NULL,
            progress_percent REAL NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'active',
            enrolled_at TEXT NOT NULL,
            completed_at TEXT,

            PRIMARY KEY (user_id, course_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "badges",
        r#"
        CREATE TABLE IF NOT EXISTS badges (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            rarity TEXT NOT NULL DEFAULT 'common',
            points INTEGER NOT NULL DEFAULT 0,
            icon TEXT,
            requirement TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0
        )
        "#,
    ),
    (
        "user_badges",
        r#"
        CREATE TABLE IF NOT EXISTS user_badges (
            user_id TEXT NOT NULL,
            badge_id TEXT NOT NULL,
            unlocked_at TEXT NOT NULL,
            is_favorite INTEGER NOT NULL DEFAULT 0,

            PRIMARY KEY (user_id, badge_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (badge_id) REFERENCES badges(id)
        )
        "#,
    ),
    (
        "notifications",
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            link TEXT,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,

            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "point_events",
        r#"
        CREATE TABLE IF NOT EXISTS point_events (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            points INTEGER NOT NULL,
            reason TEXT NOT NULL,
            reference_id TEXT,
            created_at TEXT NOT NULL,

            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "forum_posts",
        r#"
        CREATE TABLE IF NOT EXISTS forum_posts (
            id TEXT PRIMARY KEY,
            author_id TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL,

            FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "forum_replies",
        r#"
        CREATE TABLE IF NOT EXISTS forum_replies (
            id TEXT PRIMARY KEY,
            post_id TEXT NOT NULL,
            author_id TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL,

            FOREIGN KEY (post_id) REFERENCES forum_posts(id) ON DELETE CASCADE,
            FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "idx_lessons_course",
        "CREATE INDEX IF NOT EXISTS idx_lessons_course ON lessons(course_id)",
    ),
    (
        "idx_notifications_user",
        "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, is_read)",
    ),
    (
        "idx_point_events_created",
        "CREATE INDEX IF NOT EXISTS idx_point_events_created ON point_events(created_at)",
    ),
    (
        "idx_forum_replies_post",
        "CREATE INDEX IF NOT EXISTS idx_forum_replies_post ON forum_replies(post_id)",
    ),
];

impl Store {
    /// Run database migrations
    pub(crate) async fn run_migrations(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for (name, statement) in SCHEMA {
            sqlx::query(statement).execute(&mut *tx).await?;
            debug!(migration = *name, "Applied");
        }

        tx.commit().await?;

        debug!("Store migrations completed");
        Ok(())
    }
}
