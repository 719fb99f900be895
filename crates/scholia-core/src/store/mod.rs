//! SQLite-based storage for progress, stats, badges and notifications.

use crate::error::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Badge catalog rows and user unlocks.
pub mod badges;
/// Courses, lessons and enrollments.
pub mod courses;
/// Forum posts and replies.
pub mod forum;
/// Period and all-time rankings.
pub mod leaderboard;
/// Schema bootstrap.
pub mod migrations;
/// Notification inbox.
pub mod notifications;
/// Per-lesson progress.
pub mod progress;
mod rows;
/// Stats aggregate and point ledger.
pub mod stats;
/// Users and sign-in sync.
pub mod users;

#[cfg(test)]
mod tests;

pub use badges::UserBadge;
pub use courses::CourseTally;
pub use stats::{StatsDelta, StatsUpdate};

const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// SQLite-based store
#[derive(Clone)]
pub struct Store {
    pub(crate) pool: SqlitePool,
}

impl Store {
    /// Create a new store with the given connection pool
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) a database file and run migrations
    pub async fn from_path(db_path: &Path, max_connections: u32) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Writers queue on the lock instead of failing with SQLITE_BUSY
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;

        info!("SQLite store initialized at {}", db_path.display());
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;

        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    /// Get a reference to the connection pool
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap liveness probe
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Serialization(format!("invalid uuid: {e}")))
}

pub(crate) fn to_u32(value: i64, column: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| Error::Serialization(format!("{column} out of range: {value}")))
}

pub(crate) fn to_u64(value: i64, column: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| Error::Serialization(format!("{column} out of range: {value}")))
}
