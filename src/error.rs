//! Error types for GatorShare
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.
//! The session and reaction layers raise their own narrower enums
//! (`AuthError`, `ReactionError`, `FollowError`) which convert into
//! `AppError` at the handler boundary.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// in the application. It implements `IntoResponse` to
/// automatically convert errors to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// Authentication required (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Login or password check failed (401)
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Validation error (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique key already taken (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Session authorization failures
///
/// All variants surface as the same 401 response; the variant only
/// shows up in logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No member holds the presented session token
    #[error("no such session")]
    NoSuchSession,
    /// The member's stored session no longer matches the cookie
    #[error("invalid session")]
    InvalidSession,
    /// Missing or mismatched CSRF header
    #[error("invalid csrf token")]
    InvalidCsrf,
}

impl AuthError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSuchSession => "no_such_session",
            Self::InvalidSession => "invalid_session",
            Self::InvalidCsrf => "invalid_csrf",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        crate::metrics::AUTH_FAILURES_TOTAL
            .with_label_values(&[err.as_str()])
            .inc();
        tracing::debug!(reason = err.as_str(), "Authorization rejected");
        AppError::Unauthorized
    }
}

/// Like/dislike failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactionError {
    #[error("Target not found")]
    NotFound,
    #[error("Invalid action: {0}")]
    InvalidAction(String),
}

impl From<ReactionError> for AppError {
    fn from(err: ReactionError) -> Self {
        match err {
            ReactionError::NotFound => AppError::NotFound,
            ReactionError::InvalidAction(_) => AppError::Validation(err.to_string()),
        }
    }
}

/// Follow/unfollow failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FollowError {
    #[error("Cannot follow yourself")]
    SelfFollow,
    #[error("Member not found")]
    NotFound,
}

impl From<FollowError> for AppError {
    fn from(err: FollowError) -> Self {
        match err {
            FollowError::SelfFollow => AppError::Validation(err.to_string()),
            FollowError::NotFound => AppError::NotFound,
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, String, &'static str) {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string(), "not_found"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string(), "unauthorized"),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                self.to_string(),
                "invalid_credentials",
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), "validation"),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), "conflict"),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                "database",
            ),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), "config"),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "internal",
            ),
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to appropriate HTTP status code
    /// and JSON error body.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_message, error_type) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        crate::metrics::ERRORS_TOTAL
            .with_label_values(&[error_type])
            .inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_share_one_status_and_message() {
        for err in [
            AuthError::NoSuchSession,
            AuthError::InvalidSession,
            AuthError::InvalidCsrf,
        ] {
            let app_error = AppError::from(err);
            let (status, message, _) = app_error.parts();
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, "Authentication required");
        }
    }

    #[test]
    fn reaction_and_follow_errors_map_to_client_statuses() {
        let (status, _, _) = AppError::from(ReactionError::NotFound).parts();
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, message, _) =
            AppError::from(ReactionError::InvalidAction("love".to_string())).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("love"));

        let (status, _, _) = AppError::from(FollowError::SelfFollow).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) = AppError::from(FollowError::NotFound).parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn database_errors_do_not_leak_details() {
        let (status, message, _) = AppError::Database(sqlx::Error::RowNotFound).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Database error");
    }
}
