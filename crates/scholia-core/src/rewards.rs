//! Point rules and the result reported back for each rewarded action

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::badge::UnlockedBadge;

/// Fixed point awards per action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointValues {
    /// First completion of a lesson
    #[serde(default = "default_lesson_points")]
    pub lesson: u32,
    /// Course completion bonus
    #[serde(default = "default_course_points")]
    pub course: u32,
    /// New forum post
    #[serde(default = "default_forum_post_points")]
    pub forum_post: u32,
    /// New forum reply
    #[serde(default = "default_forum_reply_points")]
    pub forum_reply: u32,
}

impl Default for PointValues {
    fn default() -> Self {
        Self {
            lesson: default_lesson_points(),
            course: default_course_points(),
            forum_post: default_forum_post_points(),
            forum_reply: default_forum_reply_points(),
        }
    }
}

fn default_lesson_points() -> u32 {
    10
}
fn default_course_points() -> u32 {
    100
}
fn default_forum_post_points() -> u32 {
    5
}
fn default_forum_reply_points() -> u32 {
    3
}

/// Gamification rules (the `[gamification]` config section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Point values
    #[serde(default)]
    pub points: PointValues,
    /// Watch percentage at which a lesson counts as completed
    #[serde(default = "default_watch_threshold")]
    pub watch_completion_threshold: f64,
    /// Emit a notification for every point award, not just milestones
    #[serde(default)]
    pub notify_points: bool,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            points: PointValues::default(),
            watch_completion_threshold: default_watch_threshold(),
            notify_points: false,
        }
    }
}

fn default_watch_threshold() -> f64 {
    80.0
}

/// Bonus granted when the last lesson of a course is completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseCompletion {
    /// Completed course
    pub course_id: Uuid,
    /// Bonus points awarded
    pub points: u32,
}

/// What a single user action earned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamificationResult {
    /// Points added to the total
    pub points_awarded: u32,
    /// Level after the action, if it went up
    pub new_level: Option<u32>,
    /// Badges unlocked by the action
    pub new_achievements: Vec<UnlockedBadge>,
    /// Whether the action completed a course
    pub course_completed: bool,
    /// Course bonus details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<CourseCompletion>,
}

impl GamificationResult {
    /// Result for a plain point award
    pub fn points(points_awarded: u32, new_level: Option<u32>) -> Self {
        Self {
            points_awarded,
            new_level,
            ..Self::default()
        }
    }

    /// Combine two results of the same request (e.g. a lesson and the course
    /// it finished). Points add up, the higher level wins, badges concatenate.
    #[must_use]
    pub fn merge(mut self, other: GamificationResult) -> Self {
        self.points_awarded = self.points_awarded.saturating_add(other.points_awarded);
        self.new_level = match (self.new_level, other.new_level) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.new_achievements.extend(other.new_achievements);
        self.course_completed |= other.course_completed;
        if self.course.is_none() {
            self.course = other.course;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_point_values() {
        let config = RewardConfig::default();
        assert_eq!(config.points.lesson, 10);
        assert_eq!(config.points.course, 100);
        assert_eq!(config.watch_completion_threshold, 80.0);
        assert!(!config.notify_points);
    }

    #[test]
    fn test_config_partial_deserialize_keeps_defaults() {
        let config: RewardConfig =
            serde_json::from_str(r#"{"points": {"lesson": 25}, "notify_points": true}"#).unwrap();
        assert_eq!(config.points.lesson, 25);
        assert_eq!(config.points.forum_reply, 3);
        assert!(config.notify_points);
    }

    #[test]
    fn test_merge_lesson_with_course_bonus() {
        let lesson = GamificationResult::points(10, None);
        let course = GamificationResult {
            points_awarded: 100,
            new_level: Some(2),
            new_achievements: vec![],
            course_completed: true,
            course: Some(CourseCompletion {
                course_id: Uuid::nil(),
                points: 100,
            }),
        };

        let merged = lesson.merge(course);
        assert_eq!(merged.points_awarded, 110);
        assert_eq!(merged.new_level, Some(2));
        assert!(merged.course_completed);
        assert_eq!(merged.course.unwrap().points, 100);
    }

    #[test]
    fn test_merge_keeps_highest_level() {
        let a = GamificationResult::points(10, Some(3));
        let b = GamificationResult::points(0, Some(2));
        assert_eq!(a.merge(b).new_level, Some(3));
        let none = GamificationResult::default().merge(GamificationResult::default());
        assert_eq!(none.new_level, None);
        assert!(!none.course_completed);
    }
}
