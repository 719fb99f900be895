use super::{parse_uuid, to_u32, to_u64, Store};
use crate::error::Result;
use crate::types::LeaderboardEntry;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;

#[derive(Debug, FromRow)]
struct StandingRow {
    user_id: String,
    name: String,
    image_url: Option<String>,
    points: i64,
    level: i64,
    current_streak: i64,
    lessons_completed: i64,
}

impl Store {
    /// Rank users by points.
    ///
    /// With `since` the ranking is over ledger points earned at or after that
    /// instant, and users with nothing in the window are left out. Without
    /// it, the all-time totals are ranked. Ties go to the earlier account.
    #[instrument(skip(self))]
    pub async fn leaderboard(
        &self,
        since: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>> {
        let rows: Vec<StandingRow> = match since {
            None => {
                sqlx::query_as(
                    r#"
                    SELECT u.id AS user_id, u.name, u.image_url,
                           s.total_points AS points, s.level, s.current_streak, s.lessons_completed
                    FROM user_stats s
                    JOIN users u ON u.id = s.user_id
                    ORDER BY s.total_points DESC, u.created_at ASC, u.id ASC
                    LIMIT ?1
                    "#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            Some(since) => {
                sqlx::query_as(
                    r#"
                    SELECT u.id AS user_id, u.name, u.image_url,
                           e.points, s.level, s.current_streak, s.lessons_completed
                    FROM (
                        SELECT user_id, SUM(points) AS points
                        FROM point_events
                        WHERE created_at >= ?1
                        GROUP BY user_id
                    ) e
                    JOIN users u ON u.id = e.user_id
                    JOIN user_stats s ON s.user_id = e.user_id
                    ORDER BY e.points DESC, u.created_at ASC, u.id ASC
                    LIMIT ?2
                    "#,
                )
                .bind(since)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter()
            .enumerate()
            .map(|(index, row)| {
                Ok(LeaderboardEntry {
                    rank: index as u32 + 1,
                    user_id: parse_uuid(&row.user_id)?,
                    name: row.name,
                    image_url: row.image_url,
                    total_points: to_u64(row.points, "points")?,
                    level: to_u32(row.level, "level")?,
                    current_streak: to_u32(row.current_streak, "current_streak")?,
                    lessons_completed: to_u32(row.lessons_completed, "lessons_completed")?,
                })
            })
            .collect()
    }
}
