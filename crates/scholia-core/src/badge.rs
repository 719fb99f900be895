//! Badge catalog and unlock requirements
//!
//! Requirements are a closed set of variants. Catalog entries that do not
//! parse into one of them are dropped at load time with a warning, so a
//! malformed entry can never unlock anything.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::types::UserStats;

/// Badge rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// Common
    #[default]
    Common,
    /// Rare
    Rare,
    /// Epic
    Epic,
    /// Legendary
    Legendary,
}

impl Rarity {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }
}

impl std::str::FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "common" => Ok(Self::Common),
            "rare" => Ok(Self::Rare),
            "epic" => Ok(Self::Epic),
            "legendary" => Ok(Self::Legendary),
            _ => Err(format!("unknown rarity: {s}")),
        }
    }
}

/// Condition under which a badge unlocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requirement {
    /// Completed at least `count` lessons
    LessonsCompleted {
        /// Threshold
        count: u32,
    },
    /// Completed at least `count` courses
    CoursesCompleted {
        /// Threshold
        count: u32,
    },
    /// Earned at least `count` points
    TotalPoints {
        /// Threshold
        count: u64,
    },
    /// Reached level `count`
    Level {
        /// Threshold
        count: u32,
    },
    /// Created at least `count` forum posts
    ForumPosts {
        /// Threshold
        count: u32,
    },
    /// Created at least `count` forum replies
    ForumReplies {
        /// Threshold
        count: u32,
    },
    /// Current streak of at least `count` days
    Streak {
        /// Threshold
        count: u32,
    },
    /// Any lesson activity while the calendar month is `month` (1-12)
    MonthActivity {
        /// Calendar month, 1 = January
        month: u32,
    },
}

impl Requirement {
    /// Evaluate against a stats snapshot at instant `now`.
    pub fn is_met(&self, stats: &UserStats, now: DateTime<Utc>) -> bool {
        match *self {
            Requirement::LessonsCompleted { count } => stats.lessons_completed >= count,
            Requirement::CoursesCompleted { count } => stats.courses_completed >= count,
            Requirement::TotalPoints { count } => stats.total_points >= count,
            Requirement::Level { count } => stats.level >= count,
            Requirement::ForumPosts { count } => stats.forum_posts >= count,
            Requirement::ForumReplies { count } => stats.forum_replies >= count,
            Requirement::Streak { count } => stats.current_streak >= count,
            Requirement::MonthActivity { month } => {
                now.month() == month && stats.lessons_completed >= 1
            }
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match *self {
            Requirement::MonthActivity { month } if !(1..=12).contains(&month) => {
                Err(format!("month out of range: {month}"))
            }
            _ => Ok(()),
        }
    }
}

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    /// Stable slug
    pub id: String,
    /// Display name
    pub name: String,
    /// What it is awarded for
    pub description: String,
    /// Grouping (e.g. `learning`, `community`)
    pub category: String,
    /// Rarity
    #[serde(default)]
    pub rarity: Rarity,
    /// Display weight; unlocking does not add to the user's total
    #[serde(default)]
    pub points: u32,
    /// Icon name or URL
    #[serde(default)]
    pub icon: Option<String>,
    /// Unlock condition
    pub requirement: Requirement,
}

/// The full set of badge definitions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BadgeCatalog {
    badges: Vec<Badge>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    badges: Vec<toml::Value>,
}

impl BadgeCatalog {
    /// Build from already-parsed badges
    pub fn new(badges: Vec<Badge>) -> Self {
        Self { badges }
    }

    /// Parse a TOML document with `[[badges]]` tables.
    ///
    /// A document that is not TOML fails; a single entry that is malformed
    /// (unknown requirement type, missing fields, duplicate id) is skipped.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(source).map_err(|e| Error::Catalog(e.to_string()))?;

        let mut badges: Vec<Badge> = Vec::with_capacity(file.badges.len());
        for (index, entry) in file.badges.into_iter().enumerate() {
            let badge: Badge = match entry.try_into() {
                Ok(b) => b,
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed badge definition");
                    continue;
                }
            };
            if let Err(e) = badge.requirement.validate() {
                warn!(badge_id = %badge.id, error = %e, "Skipping badge with invalid requirement");
                continue;
            }
            if badges.iter().any(|b| b.id == badge.id) {
                warn!(badge_id = %badge.id, "Skipping duplicate badge id");
                continue;
            }
            badges.push(badge);
        }

        Ok(Self { badges })
    }

    /// Parse a requirement stored as JSON; `None` when it is not a known shape.
    pub fn parse_requirement(json: &str) -> Option<Requirement> {
        let requirement: Requirement = serde_json::from_str(json).ok()?;
        requirement.validate().ok()?;
        Some(requirement)
    }

    /// All badges
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    /// Look up by id
    pub fn get(&self, id: &str) -> Option<&Badge> {
        self.badges.iter().find(|b| b.id == id)
    }

    /// Number of badges
    pub fn len(&self) -> usize {
        self.badges.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }
}

/// A badge unlocked by the current evaluation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockedBadge {
    /// Badge id
    pub id: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Rarity
    pub rarity: Rarity,
    /// Display weight
    pub points: u32,
    /// Unlock time
    pub unlocked_at: DateTime<Utc>,
}

impl UnlockedBadge {
    pub(crate) fn from_badge(badge: &Badge, unlocked_at: DateTime<Utc>) -> Self {
        Self {
            id: badge.id.clone(),
            name: badge.name.clone(),
            description: badge.description.clone(),
            rarity: badge.rarity,
            points: badge.points,
            unlocked_at,
        }
    }
}

/// Catalog entry annotated with the user's unlock state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeStatus {
    /// Catalog fields
    #[serde(flatten)]
    pub badge: Badge,
    /// Whether the user holds it
    pub unlocked: bool,
    /// When it was unlocked
    pub unlocked_at: Option<DateTime<Utc>>,
    /// Pinned by the user
    pub is_favorite: bool,
}

/// Unlock summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeSummary {
    /// Catalog size
    pub total: u32,
    /// Badges held
    pub unlocked: u32,
    /// `unlocked / total * 100`, rounded down
    pub progress: u32,
}

/// Everything the badge page needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeBoard {
    /// Catalog with unlock state
    pub badges: Vec<BadgeStatus>,
    /// Counts
    pub stats: BadgeSummary,
}

impl BadgeBoard {
    /// Assemble and compute the summary
    pub fn new(badges: Vec<BadgeStatus>) -> Self {
        let total = badges.len() as u32;
        let unlocked = badges.iter().filter(|b| b.unlocked).count() as u32;
        let progress = if total == 0 { 0 } else { unlocked * 100 / total };
        Self {
            badges,
            stats: BadgeSummary {
                total,
                unlocked,
                progress,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn stats() -> UserStats {
        UserStats {
            user_id: Uuid::nil(),
            total_points: 0,
            level: 1,
            current_streak: 0,
            longest_streak: 0,
            last_activity_date: None,
            courses_completed: 0,
            lessons_completed: 0,
            forum_posts: 0,
            forum_replies: 0,
            updated_at: Utc::now(),
        }
    }

    fn at_month(month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, month, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_counter_requirements() {
        let mut s = stats();
        let now = at_month(1);
        let lessons = Requirement::LessonsCompleted { count: 3 };
        assert!(!lessons.is_met(&s, now));
        s.lessons_completed = 3;
        assert!(lessons.is_met(&s, now));

        s.forum_replies = 9;
        assert!(!Requirement::ForumReplies { count: 10 }.is_met(&s, now));
        s.forum_replies = 10;
        assert!(Requirement::ForumReplies { count: 10 }.is_met(&s, now));

        s.total_points = 500;
        s.level = 3;
        assert!(Requirement::TotalPoints { count: 500 }.is_met(&s, now));
        assert!(Requirement::Level { count: 3 }.is_met(&s, now));
        assert!(!Requirement::Level { count: 4 }.is_met(&s, now));
    }

    #[test]
    fn test_streak_requirement_uses_current_streak() {
        let mut s = stats();
        s.longest_streak = 10;
        s.current_streak = 2;
        assert!(!Requirement::Streak { count: 7 }.is_met(&s, at_month(1)));
        s.current_streak = 7;
        assert!(Requirement::Streak { count: 7 }.is_met(&s, at_month(1)));
    }

    #[test]
    fn test_month_activity_needs_month_and_a_lesson() {
        let mut s = stats();
        let halloween = Requirement::MonthActivity { month: 10 };
        assert!(!halloween.is_met(&s, at_month(10)));
        s.lessons_completed = 1;
        assert!(halloween.is_met(&s, at_month(10)));
        assert!(!halloween.is_met(&s, at_month(11)));
    }

    #[test]
    fn test_requirement_json_shape() {
        let r = BadgeCatalog::parse_requirement(r#"{"type":"lessons_completed","count":5}"#);
        assert_eq!(r, Some(Requirement::LessonsCompleted { count: 5 }));
        assert_eq!(
            BadgeCatalog::parse_requirement(r#"{"type":"quiz_master","count":5}"#),
            None
        );
        assert_eq!(
            BadgeCatalog::parse_requirement(r#"{"type":"month_activity","month":13}"#),
            None
        );
        assert_eq!(BadgeCatalog::parse_requirement("not json"), None);
    }

    #[test]
    fn test_catalog_from_toml_skips_malformed_entries() {
        let source = r#"
            [[badges]]
            id = "first-steps"
            name = "First Steps"
            description = "Complete your first lesson"
            category = "learning"
            rarity = "common"
            points = 10
            requirement = { type = "lessons_completed", count = 1 }

            [[badges]]
            id = "mystery"
            name = "Mystery"
            description = "Unknown requirement type"
            category = "learning"
            requirement = { type = "quiz_master", count = 3 }

            [[badges]]
            id = "first-steps"
            name = "Duplicate"
            description = "Same id again"
            category = "learning"
            requirement = { type = "level", count = 2 }

            [[badges]]
            id = "october"
            name = "Spooky Scholar"
            description = "Study in October"
            category = "seasonal"
            rarity = "rare"
            requirement = { type = "month_activity", month = 10 }
        "#;

        let catalog = BadgeCatalog::from_toml_str(source).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("first-steps").unwrap().name, "First Steps");
        assert_eq!(
            catalog.get("october").unwrap().requirement,
            Requirement::MonthActivity { month: 10 }
        );
        assert!(catalog.get("mystery").is_none());
    }

    #[test]
    fn test_catalog_rejects_invalid_toml() {
        assert!(BadgeCatalog::from_toml_str("[[badges]\nid =").is_err());
    }

    #[test]
    fn test_board_summary() {
        let badge = Badge {
            id: "a".into(),
            name: "A".into(),
            description: String::new(),
            category: "learning".into(),
            rarity: Rarity::Common,
            points: 0,
            icon: None,
            requirement: Requirement::Level { count: 2 },
        };
        let statuses = vec![
            BadgeStatus {
                badge: badge.clone(),
                unlocked: true,
                unlocked_at: Some(Utc::now()),
                is_favorite: false,
            },
            BadgeStatus {
                badge: Badge {
                    id: "b".into(),
                    ..badge.clone()
                },
                unlocked: false,
                unlocked_at: None,
                is_favorite: false,
            },
            BadgeStatus {
                badge: Badge {
                    id: "c".into(),
                    ..badge
                },
                unlocked: false,
                unlocked_at: None,
                is_favorite: false,
            },
        ];
        let board = BadgeBoard::new(statuses);
        assert_eq!(board.stats.total, 3);
        assert_eq!(board.stats.unlocked, 1);
        assert_eq!(board.stats.progress, 33);
    }
}
