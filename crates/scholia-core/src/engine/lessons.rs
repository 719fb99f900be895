use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use super::GamificationEngine;
use crate::error::{Error, Result};
use crate::notification::NewNotification;
use crate::rewards::{CourseCompletion, GamificationResult};
use crate::store::StatsDelta;
use crate::types::{Counter, Lesson, LessonProgress, PointReason};

/// Result of a lesson action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LessonOutcome {
    /// Progress after the action
    pub progress: LessonProgress,
    /// Rewards; `None` when the action did not complete the lesson
    pub gamification: Option<GamificationResult>,
}

impl GamificationEngine {
    /// Complete a lesson.
    ///
    /// Completing an already completed lesson is not an error: it returns
    /// the stored progress and a zero-point result.
    #[instrument(skip(self))]
    pub async fn complete_lesson(&self, user_id: Uuid, lesson_id: Uuid) -> Result<LessonOutcome> {
        let now = self.now();
        self.store.get_user(user_id).await?;
        let lesson = self.store.get_lesson(lesson_id).await?;
        self.store
            .ensure_enrollment(user_id, lesson.course_id, now)
            .await?;

        let (progress, gamification) = self.finish_lesson(user_id, &lesson, now).await?;
        Ok(LessonOutcome {
            progress,
            gamification: Some(gamification),
        })
    }

    /// Record a watch ping. Reaching the completion threshold completes the
    /// lesson through the same path as [`complete_lesson`](Self::complete_lesson).
    #[instrument(skip(self))]
    pub async fn update_lesson_watch(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
        watch_time_secs: u32,
        watch_percentage: f64,
    ) -> Result<LessonOutcome> {
        if !watch_percentage.is_finite() || !(0.0..=100.0).contains(&watch_percentage) {
            return Err(Error::Validation(format!(
                "watch_percentage must be between 0 and 100, got {watch_percentage}"
            )));
        }

        let now = self.now();
        self.store.get_user(user_id).await?;
        let lesson = self.store.get_lesson(lesson_id).await?;
        self.store
            .ensure_enrollment(user_id, lesson.course_id, now)
            .await?;

        let progress = self
            .store
            .record_watch(user_id, lesson_id, watch_time_secs, watch_percentage, now)
            .await?;

        if progress.is_completed || progress.watch_percentage < self.rewards.watch_completion_threshold {
            return Ok(LessonOutcome {
                progress,
                gamification: None,
            });
        }

        debug!(
            "Watch threshold reached for lesson {lesson_id} ({:.1}%)",
            progress.watch_percentage
        );
        let (progress, gamification) = self.finish_lesson(user_id, &lesson, now).await?;
        Ok(LessonOutcome {
            progress,
            gamification: Some(gamification),
        })
    }

    /// Flip the completion flag and, only for the call that flipped it, run
    /// the rewards. A rewards failure leaves the completion in place.
    async fn finish_lesson(
        &self,
        user_id: Uuid,
        lesson: &Lesson,
        now: DateTime<Utc>,
    ) -> Result<(LessonProgress, GamificationResult)> {
        let (progress, newly_completed) = self
            .store
            .mark_lesson_completed(user_id, lesson.id, now)
            .await?;

        if !newly_completed {
            debug!("Lesson {} already completed by {user_id}", lesson.id);
            return Ok((progress, GamificationResult::default()));
        }

        let gamification = self
            .reward_lesson(user_id, lesson, now)
            .await
            .map_err(|e| {
                error!(
                    "Rewards for lesson {} failed after completion was recorded: {e}",
                    lesson.id
                );
                Error::rewards_failed("lesson_completion", e)
            })?;

        Ok((progress, gamification))
    }

    async fn reward_lesson(
        &self,
        user_id: Uuid,
        lesson: &Lesson,
        now: DateTime<Utc>,
    ) -> Result<GamificationResult> {
        let delta = StatsDelta::points(self.rewards.points.lesson, PointReason::LessonCompleted)
            .with_counter(Counter::LessonsCompleted)
            .with_activity(now.date_naive())
            .with_reference(lesson.id);
        let result = self.award(user_id, delta, "completing a lesson", now).await?;

        match self.complete_course_if_done(user_id, lesson.course_id, now).await? {
            Some(course) => Ok(result.merge(course)),
            None => Ok(result),
        }
    }

    /// Recompute enrollment progress and, when every lesson is done, flip the
    /// enrollment and award the course bonus. Only the caller that performs
    /// the flip gets `Some`.
    async fn complete_course_if_done(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<GamificationResult>> {
        let tally = self.store.course_tally(user_id, course_id).await?;
        self.store
            .raise_enrollment_progress(user_id, course_id, tally.percent())
            .await?;

        if !tally.is_complete() {
            return Ok(None);
        }
        if !self.store.complete_enrollment(user_id, course_id, now).await? {
            debug!("Course {course_id} already completed by {user_id}");
            return Ok(None);
        }

        let course = self.store.get_course(course_id).await?;
        let bonus = self.rewards.points.course;
        info!("User {user_id} completed course {}", course.slug);

        let delta = StatsDelta::points(bonus, PointReason::CourseCompleted)
            .with_counter(Counter::CoursesCompleted)
            .with_reference(course_id);
        let mut result = self.award(user_id, delta, "completing a course", now).await?;
        self.notify(
            user_id,
            NewNotification::course_completed(course_id, &course.title, bonus),
            now,
        )
        .await?;

        result.course_completed = true;
        result.course = Some(CourseCompletion {
            course_id,
            points: bonus,
        });
        Ok(Some(result))
    }
}
