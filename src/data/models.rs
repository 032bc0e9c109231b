//! Data models
//!
//! Rust structs representing database entities and the reaction
//! state machine. All models use ULID for IDs and chrono for timestamps.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReactionError;

/// Author recorded on posts and comments whose member deleted their account
pub const DELETED_AUTHOR: &str = "[deleted]";

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Member
// =============================================================================

/// A registered member
///
/// The username is the identity key for every edge. Token columns hold
/// digests, never raw token values, and are `None` while logged out.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Member {
    pub username: String,
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub bio: String,
    pub session_token_hash: Option<String>,
    pub csrf_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable member fields; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct MemberUpdate {
    pub email: Option<String>,
    pub bio: Option<String>,
    pub password_hash: Option<String>,
}

impl MemberUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.bio.is_none() && self.password_hash.is_none()
    }
}

// =============================================================================
// Posts and comments
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: String,
    pub author: String,
    pub title: String,
    pub content: String,
    pub likes: i64,
    pub dislikes: i64,
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author: String,
    pub content: String,
    pub likes: i64,
    pub dislikes: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Notifications
// =============================================================================

/// Notification delivered to a member's inbox
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: String,
    /// Recipient username
    pub recipient: String,
    pub title: String,
    pub content: String,
    /// Whether the recipient has seen this
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(recipient: &str, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: EntityId::new().0,
            recipient: recipient.to_string(),
            title: title.into(),
            content: content.into(),
            read: false,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Reactions
// =============================================================================

/// Kind of entity a reaction edge points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Post,
    Comment,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }

    /// Table holding the target row and its counters
    pub(crate) fn table(&self) -> &'static str {
        match self {
            Self::Post => "posts",
            Self::Comment => "comments",
        }
    }
}

/// Reaction target: a post or comment by ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReactionTarget {
    pub kind: TargetKind,
    pub id: String,
}

impl ReactionTarget {
    pub fn post(id: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Post,
            id: id.into(),
        }
    }

    pub fn comment(id: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Comment,
            id: id.into(),
        }
    }
}

/// Like or dislike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Like,
    Dislike,
}

impl Polarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }

    /// Counter column on the target row
    pub(crate) fn counter_column(&self) -> &'static str {
        match self {
            Self::Like => "likes",
            Self::Dislike => "dislikes",
        }
    }
}

impl FromStr for Polarity {
    type Err = ReactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            other => Err(ReactionError::InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A member's relation toward one target; the three states are exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionState {
    Neutral,
    Liked,
    Disliked,
}

impl ReactionState {
    pub fn edge(&self) -> Option<Polarity> {
        match self {
            Self::Neutral => None,
            Self::Liked => Some(Polarity::Like),
            Self::Disliked => Some(Polarity::Dislike),
        }
    }

    /// Next state after `action`
    ///
    /// Repeating the held polarity toggles it off; the opposite
    /// polarity switches, removing one edge and adding the other.
    pub fn transition(self, action: Polarity) -> Transition {
        let to = match (self.edge(), action) {
            (Some(held), action) if held == action => Self::Neutral,
            (_, Polarity::Like) => Self::Liked,
            (_, Polarity::Dislike) => Self::Disliked,
        };

        Transition { from: self, to }
    }
}

/// One step of the reaction state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ReactionState,
    pub to: ReactionState,
}

impl Transition {
    /// Edge to delete (its counter is decremented by one)
    pub fn removed(&self) -> Option<Polarity> {
        self.from.edge()
    }

    /// Edge to insert (its counter is incremented by one)
    pub fn added(&self) -> Option<Polarity> {
        self.to.edge()
    }

    pub fn label(&self) -> &'static str {
        match (self.removed(), self.added()) {
            (None, Some(_)) => "added",
            (Some(_), None) => "removed",
            (Some(_), Some(_)) => "switched",
            (None, None) => "noop",
        }
    }
}

/// Denormalized counters on a post or comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReactionCounts {
    pub likes: i64,
    pub dislikes: i64,
}

/// Result of one committed reaction transition
#[derive(Debug, Clone)]
pub struct ReactionOutcome {
    pub transition: Transition,
    pub counts: ReactionCounts,
    /// Author of the target at the time of the transition
    pub owner: String,
    /// Post title or comment content, for notification text
    pub excerpt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_like_adds_edge() {
        let step = ReactionState::Neutral.transition(Polarity::Like);
        assert_eq!(step.to, ReactionState::Liked);
        assert_eq!(step.removed(), None);
        assert_eq!(step.added(), Some(Polarity::Like));
        assert_eq!(step.label(), "added");
    }

    #[test]
    fn repeating_held_polarity_toggles_off() {
        let step = ReactionState::Liked.transition(Polarity::Like);
        assert_eq!(step.to, ReactionState::Neutral);
        assert_eq!(step.removed(), Some(Polarity::Like));
        assert_eq!(step.added(), None);
        assert_eq!(step.label(), "removed");

        let step = ReactionState::Disliked.transition(Polarity::Dislike);
        assert_eq!(step.to, ReactionState::Neutral);
        assert_eq!(step.removed(), Some(Polarity::Dislike));
    }

    #[test]
    fn opposite_polarity_switches() {
        let step = ReactionState::Liked.transition(Polarity::Dislike);
        assert_eq!(step.to, ReactionState::Disliked);
        assert_eq!(step.removed(), Some(Polarity::Like));
        assert_eq!(step.added(), Some(Polarity::Dislike));
        assert_eq!(step.label(), "switched");

        let step = ReactionState::Disliked.transition(Polarity::Like);
        assert_eq!(step.to, ReactionState::Liked);
        assert_eq!(step.removed(), Some(Polarity::Dislike));
        assert_eq!(step.added(), Some(Polarity::Like));
    }

    #[test]
    fn every_transition_touches_at_most_one_edge_per_polarity() {
        for from in [
            ReactionState::Neutral,
            ReactionState::Liked,
            ReactionState::Disliked,
        ] {
            for action in [Polarity::Like, Polarity::Dislike] {
                let step = from.transition(action);
                assert_ne!(step.removed(), step.added(), "{from:?} -> {action:?}");
            }
        }
    }

    #[test]
    fn polarity_parses_only_known_actions() {
        assert_eq!("like".parse::<Polarity>(), Ok(Polarity::Like));
        assert_eq!("dislike".parse::<Polarity>(), Ok(Polarity::Dislike));
        assert_eq!(
            "Like".parse::<Polarity>(),
            Err(ReactionError::InvalidAction("Like".to_string()))
        );
        assert!("".parse::<Polarity>().is_err());
    }
}
