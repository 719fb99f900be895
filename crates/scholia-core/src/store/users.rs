use super::rows::UserRow;
use super::Store;
use crate::error::{Error, Result};
use crate::types::{User, UserProfile};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

impl Store {
    /// Create or refresh a user from identity-provider profile data.
    ///
    /// The stats row is created alongside on first sync; later syncs only
    /// touch profile fields.
    #[instrument(skip(self, profile), fields(external_id = %profile.external_id))]
    pub async fn upsert_user(&self, profile: &UserProfile, now: DateTime<Utc>) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, external_id, name, email, image_url, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            ON CONFLICT(external_id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                image_url = excluded.image_url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&profile.external_id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.image_url)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let row: UserRow = sqlx::query_as("SELECT * FROM users WHERE external_id = ?1")
            .bind(&profile.external_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO user_stats (user_id, updated_at) VALUES (?1, ?2)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(&row.id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let user = User::try_from(row)?;
        debug!("Synced user {} ({})", user.name, user.id);
        Ok(user)
    }

    /// Get a user by internal id
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        let row: UserRow = sqlx::query_as("SELECT * FROM users WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::UserNotFound(id.to_string()))?;

        row.try_into()
    }

    /// Resolve the identity-provider id to a user, if it has been synced
    #[instrument(skip(self))]
    pub async fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE external_id = ?1")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }
}
