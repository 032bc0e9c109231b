//! Request and response DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{Member, Notification};

// =============================================================================
// Generic envelopes
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Message plus payload, for create endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse<T> {
    pub message: String,
    pub data: T,
}

// =============================================================================
// Members
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `PUT /member`; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMemberRequest {
    pub email: Option<String>,
    pub bio: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Public profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberResponse {
    pub username: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            username: member.username,
            bio: member.bio,
            created_at: member.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub username: String,
}

// =============================================================================
// Posts, comments and reactions
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// `{"action": "like" | "dislike"}`; parsed into `Polarity` by the handler
#[derive(Debug, Clone, Deserialize)]
pub struct ReactionRequest {
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionResponse {
    pub message: String,
    pub likes: i64,
    pub dislikes: i64,
}

// =============================================================================
// Notifications
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationListResponse {
    pub count: i64,
    pub data: Vec<Notification>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkReadRequest {
    pub read: bool,
}
