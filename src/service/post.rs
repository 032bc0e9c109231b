//! Post service
//!
//! The posts and comments that reactions point at, plus per-member
//! listings of reacted targets.

use std::sync::Arc;

use chrono::Utc;

use super::NotificationService;
use crate::data::{Comment, Database, EntityId, Polarity, Post, TargetKind};
use crate::error::AppError;

/// Post service
pub struct PostService {
    db: Arc<Database>,
    notifications: NotificationService,
}

impl PostService {
    /// Create new post service
    pub fn new(db: Arc<Database>) -> Self {
        let notifications = NotificationService::new(db.clone());
        Self { db, notifications }
    }

    pub async fn create_post(
        &self,
        author: &str,
        title: String,
        content: String,
    ) -> Result<Post, AppError> {
        if title.trim().is_empty() {
            return Err(AppError::Validation("Title must not be empty".to_string()));
        }

        let post = Post {
            id: EntityId::new().0,
            author: author.to_string(),
            title,
            content,
            likes: 0,
            dislikes: 0,
            views: 0,
            created_at: Utc::now(),
        };
        self.db.insert_post(&post).await?;
        tracing::info!(author = %author, post_id = %post.id, "Post created");

        Ok(post)
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, AppError> {
        self.db.get_post(id).await?.ok_or(AppError::NotFound)
    }

    /// Comment on a post and notify its author
    pub async fn create_comment(
        &self,
        author: &str,
        post_id: &str,
        content: String,
    ) -> Result<Comment, AppError> {
        if content.trim().is_empty() {
            return Err(AppError::Validation("Comment must not be empty".to_string()));
        }
        let post = self.get_post(post_id).await?;

        let comment = Comment {
            id: EntityId::new().0,
            post_id: post.id,
            author: author.to_string(),
            content,
            likes: 0,
            dislikes: 0,
            created_at: Utc::now(),
        };
        self.db.insert_comment(&comment).await?;
        tracing::info!(author = %author, post_id = %post_id, comment_id = %comment.id, "Comment created");

        self.notifications
            .deliver(
                &post.author,
                author,
                "New comment on your post!",
                &format!("{author} commented: {}", comment.content),
            )
            .await;

        Ok(comment)
    }

    /// Get a comment; `NotFound` when it belongs to another post
    pub async fn get_comment(&self, post_id: &str, comment_id: &str) -> Result<Comment, AppError> {
        self.db
            .get_comment(comment_id)
            .await?
            .filter(|comment| comment.post_id == post_id)
            .ok_or(AppError::NotFound)
    }

    /// IDs of posts or comments `username` reacted to with `polarity`
    pub async fn reacted_targets(
        &self,
        username: &str,
        kind: TargetKind,
        polarity: Polarity,
    ) -> Result<Vec<String>, AppError> {
        if !self.db.member_exists(username).await? {
            return Err(AppError::NotFound);
        }
        self.db.get_reacted_target_ids(username, kind, polarity).await
    }
}
