//! Follow service

use std::sync::Arc;

use super::NotificationService;
use crate::data::Database;
use crate::error::{AppError, FollowError};

/// Follow service
pub struct FollowService {
    db: Arc<Database>,
    notifications: NotificationService,
}

impl FollowService {
    /// Create new follow service
    pub fn new(db: Arc<Database>) -> Self {
        let notifications = NotificationService::new(db.clone());
        Self { db, notifications }
    }

    /// Add the edge `follower -> followee`
    ///
    /// Self-follow is rejected before any lookup. Following twice is a
    /// no-op; only a newly created edge notifies the followee.
    ///
    /// # Returns
    /// `true` if a new edge was created
    pub async fn follow(&self, follower: &str, followee: &str) -> Result<bool, AppError> {
        self.check_pair(follower, followee).await?;

        let created = self.db.insert_follow_if_absent(follower, followee).await?;
        if created {
            crate::metrics::FOLLOWS_TOTAL
                .with_label_values(&["follow"])
                .inc();
            tracing::info!(follower = %follower, followee = %followee, "Follow created");
            self.notifications
                .deliver(
                    followee,
                    follower,
                    "New follower!",
                    &format!("{follower} started following you."),
                )
                .await;
        }

        Ok(created)
    }

    /// Remove the edge `follower -> followee`; removing an absent edge is a no-op
    ///
    /// # Returns
    /// `true` if an edge was removed
    pub async fn unfollow(&self, follower: &str, followee: &str) -> Result<bool, AppError> {
        self.check_pair(follower, followee).await?;

        let removed = self.db.delete_follow(follower, followee).await?;
        if removed {
            crate::metrics::FOLLOWS_TOTAL
                .with_label_values(&["unfollow"])
                .inc();
            tracing::info!(follower = %follower, followee = %followee, "Follow removed");
        }

        Ok(removed)
    }

    pub async fn followers(&self, username: &str) -> Result<Vec<String>, AppError> {
        self.require_member(username).await?;
        self.db.get_followers(username).await
    }

    pub async fn following(&self, username: &str) -> Result<Vec<String>, AppError> {
        self.require_member(username).await?;
        self.db.get_following(username).await
    }

    async fn check_pair(&self, follower: &str, followee: &str) -> Result<(), AppError> {
        if follower == followee {
            return Err(FollowError::SelfFollow.into());
        }
        self.require_member(follower).await?;
        self.require_member(followee).await
    }

    async fn require_member(&self, username: &str) -> Result<(), AppError> {
        if !self.db.member_exists(username).await? {
            return Err(FollowError::NotFound.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Member;
    use chrono::Utc;
    use tempfile::TempDir;

    async fn setup() -> (Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Arc::new(
            Database::connect(&temp_dir.path().join("test.db"))
                .await
                .unwrap(),
        );
        for username in ["alice", "bob"] {
            db.insert_member(&Member {
                username: username.to_string(),
                email: format!("{username}@ufl.edu"),
                password_hash: "$argon2id$placeholder".to_string(),
                bio: String::new(),
                session_token_hash: None,
                csrf_token_hash: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
        }
        (db, temp_dir)
    }

    #[tokio::test]
    async fn self_follow_fails_even_for_unknown_member() {
        let (db, _temp_dir) = setup().await;
        let service = FollowService::new(db);

        for name in ["alice", "ghost"] {
            let err = service.follow(name, name).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{name}");
        }
    }

    #[tokio::test]
    async fn follow_unknown_member_is_not_found() {
        let (db, _temp_dir) = setup().await;
        let service = FollowService::new(db);

        let err = service.follow("alice", "ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
        let err = service.followers("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn repeated_follow_notifies_once() {
        let (db, _temp_dir) = setup().await;
        let service = FollowService::new(db.clone());

        assert!(service.follow("alice", "bob").await.unwrap());
        assert!(!service.follow("alice", "bob").await.unwrap());
        assert_eq!(service.followers("bob").await.unwrap(), vec!["alice"]);

        let inbox = db.get_notifications("bob", 10, 0, false).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].content, "alice started following you.");

        assert!(service.unfollow("alice", "bob").await.unwrap());
        assert!(!service.unfollow("alice", "bob").await.unwrap());
        assert!(service.following("alice").await.unwrap().is_empty());
    }
}
