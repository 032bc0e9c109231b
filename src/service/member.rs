//! Member service
//!
//! Registration, login/logout, profile updates and account deletion.

use std::sync::Arc;

use chrono::Utc;

use crate::auth::password::{hash_password, verify_password, verify_unknown_member};
use crate::auth::{SessionTokens, issue_session, revoke_session};
use crate::data::{DELETED_AUTHOR, Database, Member, MemberUpdate};
use crate::error::AppError;

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 32;
const PASSWORD_MIN_LEN: usize = 8;

fn validate_username(username: &str) -> Result<(), AppError> {
    if username == DELETED_AUTHOR {
        return Err(AppError::Validation("Username is reserved".to_string()));
    }
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(AppError::Validation(format!(
            "Username must be {USERNAME_MIN_LEN}-{USERNAME_MAX_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
    {
        return Err(AppError::Validation(
            "Username may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AppError::Validation("Invalid email address".to_string())),
    }
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    Ok(())
}

/// Registration form
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub bio: Option<String>,
}

/// Profile changes requested by the member
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub bio: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Member service
pub struct MemberService {
    db: Arc<Database>,
}

impl MemberService {
    /// Create new member service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a member and log them in
    ///
    /// # Errors
    /// - `Validation` for a malformed username, email or password
    /// - `Conflict` when the username or email is taken
    pub async fn register(
        &self,
        registration: Registration,
    ) -> Result<(Member, SessionTokens), AppError> {
        validate_username(&registration.username)?;
        validate_email(&registration.email)?;
        validate_password(&registration.password)?;

        let now = Utc::now();
        let member = Member {
            username: registration.username,
            email: registration.email,
            password_hash: hash_password(registration.password).await?,
            bio: registration.bio.unwrap_or_default(),
            session_token_hash: None,
            csrf_token_hash: None,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_member(&member).await?;
        tracing::info!(username = %member.username, "Member registered");

        let tokens = issue_session(&self.db, &member.username).await?;
        Ok((member, tokens))
    }

    /// Verify credentials and issue a fresh session
    ///
    /// Unknown usernames and wrong passwords fail identically.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionTokens, AppError> {
        let Some(member) = self.db.get_member(username).await? else {
            verify_unknown_member(password.to_string()).await?;
            tracing::debug!(username = %username, "Login for unknown member");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password.to_string(), member.password_hash).await? {
            tracing::debug!(username = %username, "Login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        issue_session(&self.db, username).await
    }

    pub async fn logout(&self, username: &str) -> Result<(), AppError> {
        revoke_session(&self.db, username).await
    }

    pub async fn get(&self, username: &str) -> Result<Member, AppError> {
        self.db.get_member(username).await?.ok_or(AppError::NotFound)
    }

    /// Apply profile changes; the username itself is immutable
    ///
    /// A password change requires the correct current password.
    pub async fn update(&self, username: &str, changes: ProfileChanges) -> Result<Member, AppError> {
        let member = self.get(username).await?;

        if let Some(email) = &changes.email {
            validate_email(email)?;
        }

        let password_hash = match changes.new_password {
            Some(new_password) => {
                validate_password(&new_password)?;
                let current = changes
                    .current_password
                    .ok_or(AppError::InvalidCredentials)?;
                if !verify_password(current, member.password_hash).await? {
                    return Err(AppError::InvalidCredentials);
                }
                Some(hash_password(new_password).await?)
            }
            None => None,
        };

        let update = MemberUpdate {
            email: changes.email,
            bio: changes.bio,
            password_hash,
        };
        let updated = self
            .db
            .update_member(username, &update)
            .await?
            .ok_or(AppError::NotFound)?;

        tracing::info!(
            username = %username,
            password_changed = update.password_hash.is_some(),
            "Member updated"
        );
        Ok(updated)
    }

    /// Delete the account, reassigning authored content
    pub async fn delete(&self, username: &str) -> Result<(), AppError> {
        if !self.db.delete_member(username).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(username = %username, "Member deleted");
        Ok(())
    }
}
