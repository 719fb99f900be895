use serde::Serialize;
use tracing::{error, instrument};
use uuid::Uuid;

use super::GamificationEngine;
use crate::error::{Error, Result};
use crate::notification::NewNotification;
use crate::rewards::GamificationResult;
use crate::store::StatsDelta;
use crate::types::{Counter, ForumPost, ForumReply, PointReason};

/// Result of creating a forum post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostOutcome {
    /// The stored post
    pub post: ForumPost,
    /// Points for posting
    pub points_awarded: u32,
    /// Full reward summary
    pub gamification: GamificationResult,
}

/// Result of replying to a forum post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyOutcome {
    /// The stored reply
    pub reply: ForumReply,
    /// Points for replying
    pub points_awarded: u32,
    /// Full reward summary
    pub gamification: GamificationResult,
}

/// A post with its replies, oldest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForumThread {
    /// Thread starter
    pub post: ForumPost,
    /// Replies in creation order
    pub replies: Vec<ForumReply>,
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

impl GamificationEngine {
    /// Create a forum post and award posting points
    #[instrument(skip(self, content))]
    pub async fn create_forum_post(
        &self,
        user_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<PostOutcome> {
        require_text("title", title)?;
        require_text("content", content)?;

        let now = self.now();
        self.store.get_user(user_id).await?;
        let post = self.store.create_post(user_id, title, content, now).await?;

        let delta = StatsDelta::points(self.rewards.points.forum_post, PointReason::ForumPost)
            .with_counter(Counter::ForumPosts)
            .with_reference(post.id);
        let gamification = self
            .award(user_id, delta, "a forum post", now)
            .await
            .map_err(|e| {
                error!("Rewards for post {} failed after it was stored: {e}", post.id);
                Error::rewards_failed("forum_post", e)
            })?;

        Ok(PostOutcome {
            post,
            points_awarded: gamification.points_awarded,
            gamification,
        })
    }

    /// Reply to a post, award reply points and tell the post's author
    #[instrument(skip(self, content))]
    pub async fn create_forum_reply(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> Result<ReplyOutcome> {
        require_text("content", content)?;

        let now = self.now();
        let replier = self.store.get_user(user_id).await?;
        let post = self.store.get_post(post_id).await?;
        let reply = self.store.create_reply(post_id, user_id, content, now).await?;

        let rewards = async {
            let delta =
                StatsDelta::points(self.rewards.points.forum_reply, PointReason::ForumReply)
                    .with_counter(Counter::ForumReplies)
                    .with_reference(reply.id);
            let gamification = self.award(user_id, delta, "a forum reply", now).await?;

            if post.author_id != user_id {
                self.notify(
                    post.author_id,
                    NewNotification::forum_reply(post.id, &post.title, &replier.name),
                    now,
                )
                .await?;
            }
            Ok::<_, Error>(gamification)
        };
        let gamification = rewards.await.map_err(|e| {
            error!("Rewards for reply {} failed after it was stored: {e}", reply.id);
            Error::rewards_failed("forum_reply", e)
        })?;

        Ok(ReplyOutcome {
            reply,
            points_awarded: gamification.points_awarded,
            gamification,
        })
    }

    /// Load a post and its replies
    #[instrument(skip(self))]
    pub async fn get_forum_thread(&self, post_id: Uuid) -> Result<ForumThread> {
        let post = self.store.get_post(post_id).await?;
        let replies = self.store.list_replies(post_id).await?;
        Ok(ForumThread { post, replies })
    }
}
