//! Reaction service
//!
//! Like/dislike toggling on posts and comments. The state transition and
//! its counter updates commit atomically in storage; the owner's
//! notification is sent afterwards and never affects the result.

use std::sync::Arc;

use super::NotificationService;
use crate::data::{Database, Polarity, ReactionCounts, ReactionTarget, TargetKind};
use crate::error::{AppError, ReactionError};

fn notification_text(
    kind: TargetKind,
    polarity: Polarity,
    actor: &str,
    excerpt: &str,
) -> (String, String) {
    let verb = match polarity {
        Polarity::Like => "liked",
        Polarity::Dislike => "disliked",
    };
    let noun = kind.as_str();
    (
        format!("Your {noun} was {verb}!"),
        format!("{actor} {verb} your {noun}: {excerpt}"),
    )
}

/// Reaction service
pub struct ReactionService {
    db: Arc<Database>,
    notifications: NotificationService,
}

impl ReactionService {
    /// Create new reaction service
    pub fn new(db: Arc<Database>) -> Self {
        let notifications = NotificationService::new(db.clone());
        Self { db, notifications }
    }

    /// Apply `action` by `member` to `target`
    ///
    /// # Returns
    /// The target's counters after the transition
    ///
    /// # Side Effects
    /// Notifies the target's author when an edge was added (a fresh
    /// reaction or a switch), unless the author is the actor
    pub async fn apply(
        &self,
        member: &str,
        target: &ReactionTarget,
        action: Polarity,
    ) -> Result<ReactionCounts, AppError> {
        let outcome = self.db.apply_reaction(member, target, action).await?;

        crate::metrics::REACTIONS_TOTAL
            .with_label_values(&[target.kind.as_str(), outcome.transition.label()])
            .inc();
        tracing::info!(
            member = %member,
            target_kind = target.kind.as_str(),
            target_id = %target.id,
            action = %action,
            transition = outcome.transition.label(),
            likes = outcome.counts.likes,
            dislikes = outcome.counts.dislikes,
            "Reaction applied"
        );

        if let Some(added) = outcome.transition.added() {
            let (title, content) = notification_text(target.kind, added, member, &outcome.excerpt);
            self.notifications
                .deliver(&outcome.owner, member, &title, &content)
                .await;
        }

        Ok(outcome.counts)
    }

    pub async fn apply_to_post(
        &self,
        member: &str,
        post_id: &str,
        action: Polarity,
    ) -> Result<ReactionCounts, AppError> {
        self.apply(member, &ReactionTarget::post(post_id), action)
            .await
    }

    /// Comment-scoped variant; the comment must belong to `post_id`
    pub async fn apply_to_comment(
        &self,
        member: &str,
        post_id: &str,
        comment_id: &str,
        action: Polarity,
    ) -> Result<ReactionCounts, AppError> {
        let comment = self
            .db
            .get_comment(comment_id)
            .await?
            .ok_or(ReactionError::NotFound)?;
        if comment.post_id != post_id {
            return Err(ReactionError::NotFound.into());
        }

        self.apply(member, &ReactionTarget::comment(comment_id), action)
            .await
    }
}
