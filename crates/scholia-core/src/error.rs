//! Error types for scholia-core

use thiserror::Error;

/// Gamification core error type
#[derive(Debug, Error)]
pub enum Error {
    /// User not found
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Lesson not found
    #[error("lesson not found: {0}")]
    LessonNotFound(String),

    /// Course not found
    #[error("course not found: {0}")]
    CourseNotFound(String),

    /// Forum post not found
    #[error("forum post not found: {0}")]
    PostNotFound(String),

    /// Badge not found in the catalog
    #[error("badge not found: {0}")]
    BadgeNotFound(String),

    /// Notification not found (or owned by someone else)
    #[error("notification not found: {0}")]
    NotificationNotFound(String),

    /// Validation error
    #[error("validation error: {0}")]
    Validation(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Badge catalog could not be read
    #[error("catalog error: {0}")]
    Catalog(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The triggering action was stored but awarding points, badges or
    /// notifications failed afterwards.
    #[error("rewards failed after {action} was recorded: {source}")]
    RewardsFailed {
        /// The action that was persisted (e.g. `lesson_completion`)
        action: &'static str,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Whether the error refers to a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::UserNotFound(_)
                | Error::LessonNotFound(_)
                | Error::CourseNotFound(_)
                | Error::PostNotFound(_)
                | Error::BadgeNotFound(_)
                | Error::NotificationNotFound(_)
        )
    }

    /// Wrap a failure of the rewards pipeline for an already recorded action.
    pub(crate) fn rewards_failed(action: &'static str, source: Error) -> Self {
        Error::RewardsFailed {
            action,
            source: Box::new(source),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(Error::LessonNotFound("x".into()).is_not_found());
        assert!(Error::NotificationNotFound("x".into()).is_not_found());
        assert!(!Error::Validation("bad".into()).is_not_found());
    }

    #[test]
    fn test_rewards_failed_message_names_action() {
        let err = Error::rewards_failed("lesson_completion", Error::Catalog("boom".into()));
        let msg = err.to_string();
        assert!(msg.contains("lesson_completion"));
        assert!(msg.contains("boom"));
        assert!(!err.is_not_found());
    }
}
