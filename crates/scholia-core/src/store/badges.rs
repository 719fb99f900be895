use super::Store;
use crate::badge::{Badge, BadgeCatalog};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct BadgeRow {
    id: String,
    name: String,
    description: String,
    category: String,
    rarity: String,
    points: i64,
    icon: Option<String>,
    requirement: String,
}

/// A badge held by a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBadge {
    /// Badge id
    pub badge_id: String,
    /// Unlock time
    pub unlocked_at: DateTime<Utc>,
    /// Pinned by the user
    pub is_favorite: bool,
}

#[derive(Debug, FromRow)]
struct UserBadgeRow {
    badge_id: String,
    unlocked_at: DateTime<Utc>,
    is_favorite: bool,
}

impl Store {
    /// Write the catalog into the `badges` table.
    ///
    /// Existing rows are updated in place. Badges missing from the catalog
    /// are left alone so that past unlocks keep resolving.
    #[instrument(skip(self, catalog), fields(badges = catalog.len()))]
    pub async fn sync_badge_catalog(&self, catalog: &BadgeCatalog) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for (order, badge) in catalog.badges().iter().enumerate() {
            let requirement = serde_json::to_string(&badge.requirement)?;
            sqlx::query(
                r#"
                INSERT INTO badges (id, name, description, category, rarity, points, icon, requirement, sort_order)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    description = excluded.description,
                    category = excluded.category,
                    rarity = excluded.rarity,
                    points = excluded.points,
                    icon = excluded.icon,
                    requirement = excluded.requirement,
                    sort_order = excluded.sort_order
                "#,
            )
            .bind(&badge.id)
            .bind(&badge.name)
            .bind(&badge.description)
            .bind(&badge.category)
            .bind(badge.rarity.as_str())
            .bind(badge.points)
            .bind(&badge.icon)
            .bind(requirement)
            .bind(order as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!("Synced {} badge definitions", catalog.len());
        Ok(())
    }

    /// Load the catalog back from the database.
    ///
    /// Rows whose requirement does not parse are skipped with a warning.
    #[instrument(skip(self))]
    pub async fn load_badges(&self) -> Result<BadgeCatalog> {
        let rows: Vec<BadgeRow> = sqlx::query_as(
            "SELECT id, name, description, category, rarity, points, icon, requirement \
             FROM badges ORDER BY sort_order ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut badges = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(requirement) = BadgeCatalog::parse_requirement(&row.requirement) else {
                warn!(badge_id = %row.id, requirement = %row.requirement, "Skipping badge with unknown requirement");
                continue;
            };
            let rarity = match row.rarity.parse() {
                Ok(r) => r,
                Err(e) => {
                    warn!(badge_id = %row.id, error = %e, "Unknown rarity, using common");
                    Default::default()
                }
            };
            badges.push(Badge {
                id: row.id,
                name: row.name,
                description: row.description,
                category: row.category,
                rarity,
                points: super::to_u32(row.points, "points")?,
                icon: row.icon,
                requirement,
            });
        }

        Ok(BadgeCatalog::new(badges))
    }

    /// Badges the user holds, oldest unlock first
    #[instrument(skip(self))]
    pub async fn list_user_badges(&self, user_id: Uuid) -> Result<Vec<UserBadge>> {
        let rows: Vec<UserBadgeRow> = sqlx::query_as(
            r#"
            SELECT badge_id, unlocked_at, is_favorite FROM user_badges
            WHERE user_id = ?1
            ORDER BY unlocked_at ASC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| UserBadge {
                badge_id: r.badge_id,
                unlocked_at: r.unlocked_at,
                is_favorite: r.is_favorite,
            })
            .collect())
    }

    /// Record an unlock. Returns `true` only when this call created it;
    /// the (user, badge) primary key makes a racing second insert a no-op.
    #[instrument(skip(self))]
    pub async fn unlock_badge(
        &self,
        user_id: Uuid,
        badge_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_badges (user_id, badge_id, unlocked_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id, badge_id) DO NOTHING
            "#,
        )
        .bind(user_id.to_string())
        .bind(badge_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let created = result.rows_affected() == 1;
        if created {
            debug!("Badge {badge_id} unlocked by {user_id}");
        }
        Ok(created)
    }

    /// Flip the favorite flag of a held badge and return the new value
    #[instrument(skip(self))]
    pub async fn toggle_favorite(&self, user_id: Uuid, badge_id: &str) -> Result<bool> {
        let flag: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE user_badges SET is_favorite = 1 - is_favorite
            WHERE user_id = ?1 AND badge_id = ?2
            RETURNING is_favorite
            "#,
        )
        .bind(user_id.to_string())
        .bind(badge_id)
        .fetch_optional(&self.pool)
        .await?;

        flag.map(|f| f != 0)
            .ok_or_else(|| Error::BadgeNotFound(badge_id.to_string()))
    }
}
