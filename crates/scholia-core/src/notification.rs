//! Notification inbox records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::badge::UnlockedBadge;

/// Notification type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Points earned for an action
    PointsEarned,
    /// Level went up
    LevelUp,
    /// Course finished
    CourseCompleted,
    /// Badge unlocked
    BadgeUnlocked,
    /// Streak lapses unless there is activity today
    StreakAtRisk,
    /// Someone replied to the user's forum post
    ForumReply,
}

impl NotificationKind {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PointsEarned => "points_earned",
            Self::LevelUp => "level_up",
            Self::CourseCompleted => "course_completed",
            Self::BadgeUnlocked => "badge_unlocked",
            Self::StreakAtRisk => "streak_at_risk",
            Self::ForumReply => "forum_reply",
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "points_earned" => Ok(Self::PointsEarned),
            "level_up" => Ok(Self::LevelUp),
            "course_completed" => Ok(Self::CourseCompleted),
            "badge_unlocked" => Ok(Self::BadgeUnlocked),
            "streak_at_risk" => Ok(Self::StreakAtRisk),
            "forum_reply" => Ok(Self::ForumReply),
            _ => Err(format!("unknown notification kind: {s}")),
        }
    }
}

/// Stored notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification id
    pub id: Uuid,
    /// Recipient
    pub user_id: Uuid,
    /// Type
    pub kind: NotificationKind,
    /// Short title
    pub title: String,
    /// Body text
    pub message: String,
    /// Deep link into the app
    pub link: Option<String>,
    /// Read flag
    pub is_read: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Notification about to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    /// Type
    pub kind: NotificationKind,
    /// Title
    pub title: String,
    /// Body
    pub message: String,
    /// Deep link
    pub link: Option<String>,
}

impl NewNotification {
    /// Points earned for `action`
    pub fn points_earned(points: u32, action: &str) -> Self {
        Self {
            kind: NotificationKind::PointsEarned,
            title: format!("+{points} points"),
            message: format!("You earned {points} points for {action}."),
            link: Some("/profile".to_string()),
        }
    }

    /// Level up
    pub fn level_up(level: u32) -> Self {
        Self {
            kind: NotificationKind::LevelUp,
            title: "Level up!".to_string(),
            message: format!("Congratulations! You reached level {level}."),
            link: Some("/profile".to_string()),
        }
    }

    /// Course completed
    pub fn course_completed(course_id: Uuid, course_title: &str, bonus: u32) -> Self {
        Self {
            kind: NotificationKind::CourseCompleted,
            title: "Course completed".to_string(),
            message: format!("You finished \"{course_title}\" and earned {bonus} bonus points."),
            link: Some(format!("/courses/{course_id}")),
        }
    }

    /// Badge unlocked
    pub fn badge_unlocked(badge: &UnlockedBadge) -> Self {
        Self {
            kind: NotificationKind::BadgeUnlocked,
            title: format!("New badge: {}", badge.name),
            message: badge.description.clone(),
            link: Some("/badges".to_string()),
        }
    }

    /// Streak at risk
    pub fn streak_at_risk(current_streak: u32) -> Self {
        Self {
            kind: NotificationKind::StreakAtRisk,
            title: "Your streak is at risk".to_string(),
            message: format!(
                "Complete a lesson today to keep your {current_streak}-day streak going."
            ),
            link: Some("/dashboard".to_string()),
        }
    }

    /// Reply to one of the user's posts
    pub fn forum_reply(post_id: Uuid, post_title: &str, replier: &str) -> Self {
        Self {
            kind: NotificationKind::ForumReply,
            title: "New reply".to_string(),
            message: format!("{replier} replied to \"{post_title}\"."),
            link: Some(format!("/forum/{post_id}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!(
            "streak_at_risk".parse::<NotificationKind>(),
            Ok(NotificationKind::StreakAtRisk)
        );
        assert!("newsletter".parse::<NotificationKind>().is_err());
    }

    #[test]
    fn test_builders() {
        let n = NewNotification::level_up(4);
        assert_eq!(n.kind, NotificationKind::LevelUp);
        assert!(n.message.contains('4'));

        let course = Uuid::new_v4();
        let n = NewNotification::course_completed(course, "Rust 101", 100);
        assert_eq!(n.link.as_deref(), Some(format!("/courses/{course}").as_str()));
        assert!(n.message.contains("Rust 101"));

        let n = NewNotification::streak_at_risk(6);
        assert!(n.message.contains("6-day"));
    }
}
