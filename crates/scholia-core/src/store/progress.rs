use super::rows::ProgressRow;
use super::Store;
use crate::error::{Error, Result};
use crate::types::LessonProgress;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

impl Store {
    /// Create the (user, lesson) row if it does not exist yet
    async fn touch_progress(&self, user_id: Uuid, lesson_id: Uuid, now: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO lesson_progress (user_id, lesson_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT(user_id, lesson_id) DO NOTHING
            "#,
        )
        .bind(user_id.to_string())
        .bind(lesson_id.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get progress for a (user, lesson) pair
    #[instrument(skip(self))]
    pub async fn get_progress(&self, user_id: Uuid, lesson_id: Uuid) -> Result<Option<LessonProgress>> {
        let row: Option<ProgressRow> = sqlx::query_as(
            "SELECT * FROM lesson_progress WHERE user_id = ?1 AND lesson_id = ?2",
        )
        .bind(user_id.to_string())
        .bind(lesson_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(LessonProgress::try_from).transpose()
    }

    async fn fetch_progress(&self, user_id: Uuid, lesson_id: Uuid) -> Result<LessonProgress> {
        self.get_progress(user_id, lesson_id)
            .await?
            .ok_or_else(|| Error::LessonNotFound(lesson_id.to_string()))
    }

    /// Mark a lesson completed.
    ///
    /// The flip is a conditional update on `is_completed = 0`, so among any
    /// number of concurrent or repeated calls exactly one gets `true` back.
    #[instrument(skip(self))]
    pub async fn mark_lesson_completed(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(LessonProgress, bool)> {
        self.touch_progress(user_id, lesson_id, now).await?;

        let result = sqlx::query(
            r#"
            UPDATE lesson_progress
            SET is_completed = 1, completed_at = ?3, updated_at = ?3
            WHERE user_id = ?1 AND lesson_id = ?2 AND is_completed = 0
            "#,
        )
        .bind(user_id.to_string())
        .bind(lesson_id.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        let newly_completed = result.rows_affected() == 1;
        if newly_completed {
            debug!("Lesson {lesson_id} completed by {user_id}");
        }

        Ok((self.fetch_progress(user_id, lesson_id).await?, newly_completed))
    }

    /// Record a watch ping. Both values only ever move up.
    #[instrument(skip(self))]
    pub async fn record_watch(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
        watch_time_secs: u32,
        watch_percentage: f64,
        now: DateTime<Utc>,
    ) -> Result<LessonProgress> {
        self.touch_progress(user_id, lesson_id, now).await?;

        sqlx::query(
            r#"
            UPDATE lesson_progress
            SET watch_percentage = MAX(watch_percentage, ?3),
                watch_time_secs = MAX(watch_time_secs, ?4),
                updated_at = ?5
            WHERE user_id = ?1 AND lesson_id = ?2
            "#,
        )
        .bind(user_id.to_string())
        .bind(lesson_id.to_string())
        .bind(watch_percentage)
        .bind(watch_time_secs)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.fetch_progress(user_id, lesson_id).await
    }
}
