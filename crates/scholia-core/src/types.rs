//! Domain records shared by the store and the engine

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::level::LevelProgress;
use crate::streak::Streak;

/// A platform user, anchored to an identity-provider id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Internal id
    pub id: Uuid,
    /// Stable id issued by the identity provider
    pub external_id: String,
    /// Display name
    pub name: String,
    /// Email, when the provider shares it
    pub email: Option<String>,
    /// Avatar URL
    pub image_url: Option<String>,
    /// First sign-in
    pub created_at: DateTime<Utc>,
    /// Last profile sync
    pub updated_at: DateTime<Utc>,
}

/// Profile fields received from the identity provider on sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable provider id
    pub external_id: String,
    /// Display name
    pub name: String,
    /// Email
    #[serde(default)]
    pub email: Option<String>,
    /// Avatar URL
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Course id
    pub id: Uuid,
    /// URL slug, unique
    pub slug: String,
    /// Title
    pub title: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// A lesson within a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    /// Lesson id
    pub id: Uuid,
    /// Owning course
    pub course_id: Uuid,
    /// Title
    pub title: String,
    /// Position inside the course, unique per course
    pub position: u32,
}

/// Per-(user, lesson) progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonProgress {
    /// Owner
    pub user_id: Uuid,
    /// Lesson
    pub lesson_id: Uuid,
    /// Never reverts once true
    pub is_completed: bool,
    /// Set together with `is_completed`
    pub completed_at: Option<DateTime<Utc>>,
    /// Highest watch percentage reported, 0-100
    pub watch_percentage: f64,
    /// Highest watch position reported, in seconds
    pub watch_time_secs: u32,
    /// First interaction
    pub created_at: DateTime<Utc>,
    /// Last update
    pub updated_at: DateTime<Utc>,
}

/// Enrollment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    /// In progress
    Active,
    /// Every lesson completed; terminal
    Completed,
}

impl EnrollmentStatus {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl std::str::FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("unknown enrollment status: {s}")),
        }
    }
}

/// A user's relationship to a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Owner
    pub user_id: Uuid,
    /// Course
    pub course_id: Uuid,
    /// `completed_lessons / total_lessons * 100`, never decreases
    pub progress_percent: f64,
    /// Status
    pub status: EnrollmentStatus,
    /// Enrollment time
    pub enrolled_at: DateTime<Utc>,
    /// Set on the ACTIVE -> COMPLETED transition
    pub completed_at: Option<DateTime<Utc>>,
}

/// Denormalized per-user totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    /// Owner
    pub user_id: Uuid,
    /// Cumulative points, never decreases
    pub total_points: u64,
    /// `level_for(total_points)`
    pub level: u32,
    /// Current daily streak
    pub current_streak: u32,
    /// Longest daily streak
    pub longest_streak: u32,
    /// Day of the last lesson completion
    pub last_activity_date: Option<NaiveDate>,
    /// Courses completed
    pub courses_completed: u32,
    /// Lessons completed
    pub lessons_completed: u32,
    /// Forum posts created
    pub forum_posts: u32,
    /// Forum replies created
    pub forum_replies: u32,
    /// Last change
    pub updated_at: DateTime<Utc>,
}

impl UserStats {
    /// Streak fields as a value
    pub fn streak(&self) -> Streak {
        Streak {
            current: self.current_streak,
            longest: self.longest_streak,
            last_active: self.last_activity_date,
        }
    }
}

/// Stats plus level progress, as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsView {
    /// Raw aggregate
    #[serde(flatten)]
    pub stats: UserStats,
    /// Position inside the current level
    pub level_progress: LevelProgress,
}

/// Counters that a single event may bump by one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// `lessons_completed`
    LessonsCompleted,
    /// `courses_completed`
    CoursesCompleted,
    /// `forum_posts`
    ForumPosts,
    /// `forum_replies`
    ForumReplies,
}

impl Counter {
    /// Column on `user_stats`
    pub fn column(&self) -> &'static str {
        match self {
            Self::LessonsCompleted => "lessons_completed",
            Self::CoursesCompleted => "courses_completed",
            Self::ForumPosts => "forum_posts",
            Self::ForumReplies => "forum_replies",
        }
    }
}

/// Why points were granted; recorded on the point ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointReason {
    /// First completion of a lesson
    LessonCompleted,
    /// Course finished
    CourseCompleted,
    /// Forum post created
    ForumPost,
    /// Forum reply created
    ForumReply,
}

impl PointReason {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LessonCompleted => "lesson_completed",
            Self::CourseCompleted => "course_completed",
            Self::ForumPost => "forum_post",
            Self::ForumReply => "forum_reply",
        }
    }
}

/// A forum thread starter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumPost {
    /// Post id
    pub id: Uuid,
    /// Author
    pub author_id: Uuid,
    /// Title
    pub title: String,
    /// Body
    pub content: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// A reply in a forum thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumReply {
    /// Reply id
    pub id: Uuid,
    /// Thread
    pub post_id: Uuid,
    /// Author
    pub author_id: Uuid,
    /// Body
    pub content: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Leaderboard window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeaderboardPeriod {
    /// Lifetime totals
    #[default]
    AllTime,
    /// Since the first day of the current month (UTC)
    Monthly,
    /// Since Monday of the current ISO week (UTC)
    Weekly,
}

impl std::str::FromStr for LeaderboardPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all-time" => Ok(Self::AllTime),
            "monthly" => Ok(Self::Monthly),
            "weekly" => Ok(Self::Weekly),
            _ => Err(format!("unknown leaderboard period: {s}")),
        }
    }
}

impl LeaderboardPeriod {
    /// First instant counted by the window at `now`; `None` for all-time.
    pub fn window_start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        let first_day = match self {
            Self::AllTime => return None,
            Self::Monthly => today.with_day(1)?,
            Self::Weekly => {
                today - chrono::Days::new(u64::from(today.weekday().num_days_from_monday()))
            }
        };
        Some(first_day.and_time(NaiveTime::MIN).and_utc())
    }
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based rank
    pub rank: u32,
    /// User id
    pub user_id: Uuid,
    /// Display name
    pub name: String,
    /// Avatar
    pub image_url: Option<String>,
    /// Points within the period
    pub total_points: u64,
    /// Current level
    pub level: u32,
    /// Current streak
    pub current_streak: u32,
    /// Lessons completed
    pub lessons_completed: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parsing() {
        assert_eq!("all-time".parse(), Ok(LeaderboardPeriod::AllTime));
        assert_eq!("weekly".parse(), Ok(LeaderboardPeriod::Weekly));
        assert!("daily".parse::<LeaderboardPeriod>().is_err());
    }

    #[test]
    fn test_period_serde_matches_query_strings() {
        let json = serde_json::to_string(&LeaderboardPeriod::AllTime).unwrap();
        assert_eq!(json, "\"all-time\"");
        let parsed: LeaderboardPeriod = serde_json::from_str("\"monthly\"").unwrap();
        assert_eq!(parsed, LeaderboardPeriod::Monthly);
    }

    #[test]
    fn test_window_start() {
        use chrono::TimeZone;

        // Thursday
        let now = Utc.with_ymd_and_hms(2026, 10, 15, 17, 30, 0).unwrap();
        assert_eq!(LeaderboardPeriod::AllTime.window_start(now), None);
        assert_eq!(
            LeaderboardPeriod::Monthly.window_start(now),
            Some(Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            LeaderboardPeriod::Weekly.window_start(now),
            Some(Utc.with_ymd_and_hms(2026, 10, 12, 0, 0, 0).unwrap())
        );

        let monday = Utc.with_ymd_and_hms(2026, 10, 12, 0, 0, 0).unwrap();
        assert_eq!(LeaderboardPeriod::Weekly.window_start(monday), Some(monday));
    }

    #[test]
    fn test_enrollment_status_round_trip() {
        for status in [EnrollmentStatus::Active, EnrollmentStatus::Completed] {
            assert_eq!(status.as_str().parse::<EnrollmentStatus>(), Ok(status));
        }
        let json = serde_json::to_string(&EnrollmentStatus::Completed).unwrap();
        assert_eq!(json, "\"COMPLETED\"");
    }
}
