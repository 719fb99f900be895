use super::rows::{CourseRow, EnrollmentRow, LessonRow};
use super::Store;
use crate::error::{Error, Result};
use crate::types::{Course, Enrollment, Lesson};
use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Completed versus total lessons of one course for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseTally {
    /// Lessons the user has completed
    pub completed: u32,
    /// Lessons in the course
    pub total: u32,
}

impl CourseTally {
    /// `completed / total * 100`; a course without lessons is at 0
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (f64::from(self.completed) / f64::from(self.total) * 100.0).min(100.0)
        }
    }

    /// Every lesson done (and there is at least one)
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

impl Store {
    // =========================================================================
    // Course catalog
    // =========================================================================

    /// Insert a course, or update its title when the slug already exists
    #[instrument(skip(self))]
    pub async fn upsert_course(&self, slug: &str, title: &str, now: DateTime<Utc>) -> Result<Course> {
        sqlx::query(
            r#"
            INSERT INTO courses (id, slug, title, created_at) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(slug) DO UPDATE SET title = excluded.title
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(slug)
        .bind(title)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row: CourseRow = sqlx::query_as("SELECT * FROM courses WHERE slug = ?1")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        debug!("Saved course {slug}");
        row.try_into()
    }

    /// Get a course by id
    #[instrument(skip(self))]
    pub async fn get_course(&self, id: Uuid) -> Result<Course> {
        let row: CourseRow = sqlx::query_as("SELECT * FROM courses WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::CourseNotFound(id.to_string()))?;

        row.try_into()
    }

    /// Insert a lesson at `position`, or retitle the lesson already there
    #[instrument(skip(self))]
    pub async fn upsert_lesson(&self, course_id: Uuid, position: u32, title: &str) -> Result<Lesson> {
        sqlx::query(
            r#"
            INSERT INTO lessons (id, course_id, title, position) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(course_id, position) DO UPDATE SET title = excluded.title
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(course_id.to_string())
        .bind(title)
        .bind(position)
        .execute(&self.pool)
        .await?;

        let row: LessonRow =
            sqlx::query_as("SELECT * FROM lessons WHERE course_id = ?1 AND position = ?2")
                .bind(course_id.to_string())
                .bind(position)
                .fetch_one(&self.pool)
                .await?;

        row.try_into()
    }

    /// Get a lesson by id
    #[instrument(skip(self))]
    pub async fn get_lesson(&self, id: Uuid) -> Result<Lesson> {
        let row: LessonRow = sqlx::query_as("SELECT * FROM lessons WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::LessonNotFound(id.to_string()))?;

        row.try_into()
    }

    /// Lessons of a course in position order
    #[instrument(skip(self))]
    pub async fn list_lessons(&self, course_id: Uuid) -> Result<Vec<Lesson>> {
        let rows: Vec<LessonRow> =
            sqlx::query_as("SELECT * FROM lessons WHERE course_id = ?1 ORDER BY position ASC")
                .bind(course_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Lesson::try_from).collect()
    }

    // =========================================================================
    // Enrollments
    // =========================================================================

    /// Enroll a user; a no-op when already enrolled
    #[instrument(skip(self))]
    pub async fn ensure_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Enrollment> {
        sqlx::query(
            r#"
            INSERT INTO enrollments (user_id, course_id, enrolled_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id, course_id) DO NOTHING
            "#,
        )
        .bind(user_id.to_string())
        .bind(course_id.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_enrollment(user_id, course_id)
            .await?
            .ok_or_else(|| Error::CourseNotFound(course_id.to_string()))
    }

    /// Get an enrollment
    #[instrument(skip(self))]
    pub async fn get_enrollment(&self, user_id: Uuid, course_id: Uuid) -> Result<Option<Enrollment>> {
        let row: Option<EnrollmentRow> =
            sqlx::query_as("SELECT * FROM enrollments WHERE user_id = ?1 AND course_id = ?2")
                .bind(user_id.to_string())
                .bind(course_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Enrollment::try_from).transpose()
    }

    /// All enrollments of a user, most recent first
    #[instrument(skip(self))]
    pub async fn list_enrollments(&self, user_id: Uuid) -> Result<Vec<Enrollment>> {
        let rows: Vec<EnrollmentRow> = sqlx::query_as(
            "SELECT * FROM enrollments WHERE user_id = ?1 ORDER BY enrolled_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Enrollment::try_from).collect()
    }

    /// Count completed and total lessons of a course for a user
    #[instrument(skip(self))]
    pub async fn course_tally(&self, user_id: Uuid, course_id: Uuid) -> Result<CourseTally> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(CASE WHEN p.is_completed = 1 THEN 1 ELSE 0 END), 0) AS completed
            FROM lessons l
            LEFT JOIN lesson_progress p ON p.lesson_id = l.id AND p.user_id = ?1
            WHERE l.course_id = ?2
            "#,
        )
        .bind(user_id.to_string())
        .bind(course_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        let total: i64 = row.try_get("total")?;
        let completed: i64 = row.try_get("completed")?;

        Ok(CourseTally {
            completed: super::to_u32(completed, "completed")?,
            total: super::to_u32(total, "total")?,
        })
    }

    /// Raise the stored percentage to `percent`; a lower value is ignored
    #[instrument(skip(self))]
    pub async fn raise_enrollment_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        percent: f64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE enrollments
            SET progress_percent = MAX(progress_percent, ?3)
            WHERE user_id = ?1 AND course_id = ?2
            "#,
        )
        .bind(user_id.to_string())
        .bind(course_id.to_string())
        .bind(percent)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Flip ACTIVE -> COMPLETED. Returns `true` only for the call that
    /// performed the transition.
    #[instrument(skip(self))]
    pub async fn complete_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE enrollments
            SET status = 'completed', completed_at = ?3, progress_percent = 100
            WHERE user_id = ?1 AND course_id = ?2 AND status = 'active'
            "#,
        )
        .bind(user_id.to_string())
        .bind(course_id.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
