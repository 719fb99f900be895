//! Raw table rows and their conversion into domain records

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use super::{parse_uuid, to_u32, to_u64};
use crate::error::{Error, Result};
use crate::notification::Notification;
use crate::types::{
    Course, Enrollment, ForumPost, ForumReply, Lesson, LessonProgress, User, UserStats,
};

#[derive(Debug, FromRow)]
pub(super) struct UserRow {
    pub id: String,
    pub external_id: String,
    pub name: String,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: parse_uuid(&row.id)?,
            external_id: row.external_id,
            name: row.name,
            email: row.email,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct StatsRow {
    pub user_id: String,
    pub total_points: i64,
    pub level: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_activity_date: Option<NaiveDate>,
    pub courses_completed: i64,
    pub lessons_completed: i64,
    pub forum_posts: i64,
    pub forum_replies: i64,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<StatsRow> for UserStats {
    type Error = Error;

    fn try_from(row: StatsRow) -> Result<Self> {
        Ok(UserStats {
            user_id: parse_uuid(&row.user_id)?,
            total_points: to_u64(row.total_points, "total_points")?,
            level: to_u32(row.level, "level")?,
            current_streak: to_u32(row.current_streak, "current_streak")?,
            longest_streak: to_u32(row.longest_streak, "longest_streak")?,
            last_activity_date: row.last_activity_date,
            courses_completed: to_u32(row.courses_completed, "courses_completed")?,
            lessons_completed: to_u32(row.lessons_completed, "lessons_completed")?,
            forum_posts: to_u32(row.forum_posts, "forum_posts")?,
            forum_replies: to_u32(row.forum_replies, "forum_replies")?,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct CourseRow {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CourseRow> for Course {
    type Error = Error;

    fn try_from(row: CourseRow) -> Result<Self> {
        Ok(Course {
            id: parse_uuid(&row.id)?,
            slug: row.slug,
            title: row.title,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct LessonRow {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub position: i64,
}

impl TryFrom<LessonRow> for Lesson {
    type Error = Error;

    fn try_from(row: LessonRow) -> Result<Self> {
        Ok(Lesson {
            id: parse_uuid(&row.id)?,
            course_id: parse_uuid(&row.course_id)?,
            title: row.title,
            position: to_u32(row.position, "position")?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct ProgressRow {
    pub user_id: String,
    pub lesson_id: String,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub watch_percentage: f64,
    pub watch_time_secs: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProgressRow> for LessonProgress {
    type Error = Error;

    fn try_from(row: ProgressRow) -> Result<Self> {
        Ok(LessonProgress {
            user_id: parse_uuid(&row.user_id)?,
            lesson_id: parse_uuid(&row.lesson_id)?,
            is_completed: row.is_completed,
            completed_at: row.completed_at,
            watch_percentage: row.watch_percentage,
            watch_time_secs: to_u32(row.watch_time_secs, "watch_time_secs")?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct EnrollmentRow {
    pub user_id: String,
    pub course_id: String,
    pub progress_percent: f64,
    pub status: String,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = Error;

    fn try_from(row: EnrollmentRow) -> Result<Self> {
        Ok(Enrollment {
            user_id: parse_uuid(&row.user_id)?,
            course_id: parse_uuid(&row.course_id)?,
            progress_percent: row.progress_percent,
            status: row.status.parse().map_err(Error::Serialization)?,
            enrolled_at: row.enrolled_at,
            completed_at: row.completed_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct NotificationRow {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = Error;

    fn try_from(row: NotificationRow) -> Result<Self> {
        Ok(Notification {
            id: parse_uuid(&row.id)?,
            user_id: parse_uuid(&row.user_id)?,
            kind: row.kind.parse().map_err(Error::Serialization)?,
            title: row.title,
            message: row.message,
            link: row.link,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct PostRow {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for ForumPost {
    type Error = Error;

    fn try_from(row: PostRow) -> Result<Self> {
        Ok(ForumPost {
            id: parse_uuid(&row.id)?,
            author_id: parse_uuid(&row.author_id)?,
            title: row.title,
            content: row.content,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct ReplyRow {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReplyRow> for ForumReply {
    type Error = Error;

    fn try_from(row: ReplyRow) -> Result<Self> {
        Ok(ForumReply {
            id: parse_uuid(&row.id)?,
            post_id: parse_uuid(&row.post_id)?,
            author_id: parse_uuid(&row.author_id)?,
            content: row.content,
            created_at: row.created_at,
        })
    }
}
