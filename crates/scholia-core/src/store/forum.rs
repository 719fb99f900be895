use super::rows::{PostRow, ReplyRow};
use super::Store;
use crate::error::{Error, Result};
use crate::types::{ForumPost, ForumReply};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

impl Store {
    /// Create a forum post
    #[instrument(skip(self, content))]
    pub async fn create_post(
        &self,
        author_id: Uuid,
        title: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<ForumPost> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO forum_posts (id, author_id, title, content, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(id.to_string())
        .bind(author_id.to_string())
        .bind(title)
        .bind(content)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!("Created forum post {id}");
        Ok(ForumPost {
            id,
            author_id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Get a forum post by id
    #[instrument(skip(self))]
    pub async fn get_post(&self, id: Uuid) -> Result<ForumPost> {
        let row: PostRow = sqlx::query_as("SELECT * FROM forum_posts WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::PostNotFound(id.to_string()))?;

        row.try_into()
    }

    /// Create a reply to an existing post
    #[instrument(skip(self, content))]
    pub async fn create_reply(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<ForumReply> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO forum_replies (id, post_id, author_id, content, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(id.to_string())
        .bind(post_id.to_string())
        .bind(author_id.to_string())
        .bind(content)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!("Created reply {id} on post {post_id}");
        Ok(ForumReply {
            id,
            post_id,
            author_id,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Replies to a post, oldest first
    #[instrument(skip(self))]
    pub async fn list_replies(&self, post_id: Uuid) -> Result<Vec<ForumReply>> {
        let rows: Vec<ReplyRow> = sqlx::query_as(
            "SELECT * FROM forum_replies WHERE post_id = ?1 ORDER BY created_at ASC, id ASC",
        )
        .bind(post_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ForumReply::try_from).collect()
    }
}
