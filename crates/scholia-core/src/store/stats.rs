use super::rows::StatsRow;
use super::Store;
use crate::error::{Error, Result};
use crate::level::level_for;
use crate::types::{Counter, PointReason, UserStats};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

/// One logical event's worth of stats changes
#[derive(Debug, Clone, PartialEq)]
pub struct StatsDelta {
    /// Points to add (never negative)
    pub points: u32,
    /// Counter to bump by one
    pub counter: Option<Counter>,
    /// Day of a streak-qualifying activity
    pub activity_day: Option<NaiveDate>,
    /// Ledger reason
    pub reason: PointReason,
    /// Lesson, course or post the points are for
    pub reference_id: Option<Uuid>,
}

impl StatsDelta {
    /// Points with a ledger reason and nothing else
    pub fn points(points: u32, reason: PointReason) -> Self {
        Self {
            points,
            counter: None,
            activity_day: None,
            reason,
            reference_id: None,
        }
    }

    /// Also bump `counter`
    #[must_use]
    pub fn with_counter(mut self, counter: Counter) -> Self {
        self.counter = Some(counter);
        self
    }

    /// Also count as activity on `day`
    #[must_use]
    pub fn with_activity(mut self, day: NaiveDate) -> Self {
        self.activity_day = Some(day);
        self
    }

    /// Attach the entity the points are for
    #[must_use]
    pub fn with_reference(mut self, id: Uuid) -> Self {
        self.reference_id = Some(id);
        self
    }
}

/// Stats after a delta was applied
#[derive(Debug, Clone, PartialEq)]
pub struct StatsUpdate {
    /// Aggregate after the change
    pub stats: UserStats,
    /// Level before the change
    pub previous_level: u32,
}

impl StatsUpdate {
    /// The new level when this update crossed a level boundary
    pub fn level_up(&self) -> Option<u32> {
        (self.stats.level > self.previous_level).then_some(self.stats.level)
    }
}

impl Store {
    /// Get the stats aggregate of a user
    #[instrument(skip(self))]
    pub async fn get_user_stats(&self, user_id: Uuid) -> Result<UserStats> {
        let row: StatsRow = sqlx::query_as("SELECT * FROM user_stats WHERE user_id = ?1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;

        row.try_into()
    }

    /// Apply a delta atomically.
    ///
    /// The relative increment runs first so the transaction holds the write
    /// lock before anything is read; points, counter, streak, level and the
    /// ledger row commit together or not at all.
    #[instrument(skip(self, delta), fields(points = delta.points, reason = delta.reason.as_str()))]
    pub async fn apply_stats_delta(
        &self,
        user_id: Uuid,
        delta: &StatsDelta,
        now: DateTime<Utc>,
    ) -> Result<StatsUpdate> {
        let counter_sql = delta
            .counter
            .map(|c| format!(", {col} = {col} + 1", col = c.column()))
            .unwrap_or_default();
        let increment_sql = format!(
            "UPDATE user_stats SET total_points = total_points + ?2{counter_sql}, updated_at = ?3 \
             WHERE user_id = ?1"
        );

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(&increment_sql)
            .bind(user_id.to_string())
            .bind(i64::from(delta.points))
            .bind(now)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::UserNotFound(user_id.to_string()));
        }

        let row: StatsRow = sqlx::query_as("SELECT * FROM user_stats WHERE user_id = ?1")
            .bind(user_id.to_string())
            .fetch_one(&mut *tx)
            .await?;
        let mut stats = UserStats::try_from(row)?;
        let previous_level = stats.level;

        if let Some(day) = delta.activity_day {
            let before = stats.streak();
            let after = before.record_activity(day);
            if after != before {
                sqlx::query(
                    r#"
                    UPDATE user_stats
                    SET current_streak = ?2,
                        longest_streak = MAX(longest_streak, ?3),
                        last_activity_date = ?4
                    WHERE user_id = ?1
                    "#,
                )
                .bind(user_id.to_string())
                .bind(after.current)
                .bind(after.longest)
                .bind(after.last_active)
                .execute(&mut *tx)
                .await?;

                stats.current_streak = after.current;
                stats.longest_streak = after.longest;
                stats.last_activity_date = after.last_active;
            }
        }

        let level = level_for(stats.total_points);
        if level > stats.level {
            sqlx::query("UPDATE user_stats SET level = MAX(level, ?2) WHERE user_id = ?1")
                .bind(user_id.to_string())
                .bind(level)
                .execute(&mut *tx)
                .await?;
            stats.level = level;
        }

        if delta.points > 0 {
            sqlx::query(
                r#"
                INSERT INTO point_events (id, user_id, points, reason, reference_id, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(user_id.to_string())
            .bind(i64::from(delta.points))
            .bind(delta.reason.as_str())
            .bind(delta.reference_id.map(|id| id.to_string()))
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(
            "Applied stats delta for {}: total={}, level={}, streak={}",
            user_id, stats.total_points, stats.level, stats.current_streak
        );
        Ok(StatsUpdate {
            stats,
            previous_level,
        })
    }

    /// Users whose streak lapses unless they are active on `today`
    #[instrument(skip(self))]
    pub async fn list_streaks_at_risk(&self, today: NaiveDate) -> Result<Vec<UserStats>> {
        let Some(yesterday) = today.pred_opt() else {
            return Ok(Vec::new());
        };

        let rows: Vec<StatsRow> = sqlx::query_as(
            r#"
            SELECT * FROM user_stats
            WHERE current_streak > 0 AND last_activity_date = ?1
            "#,
        )
        .bind(yesterday)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserStats::try_from).collect()
    }
}
