//! Session management
//!
//! Each member holds at most one session: a random session token
//! (httpOnly cookie) paired with a random CSRF token (script-readable
//! cookie, echoed back in the `X-CSRF-Token` header). Only SHA-256
//! digests of both tokens are persisted.

use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::data::Database;
use crate::error::AppError;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "session_token";
/// Cookie carrying the CSRF token
pub const CSRF_COOKIE: &str = "csrf_token";
/// Header the client echoes the CSRF token in
pub const CSRF_HEADER: &str = "x-csrf-token";

const TOKEN_BYTES: usize = 32;
const TOKEN_HASH_PREFIX: &str = "sha256:";
const MAX_ISSUE_ATTEMPTS: usize = 3;

/// Freshly issued token pair, returned once for transport as cookies
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub session_token: String,
    pub csrf_token: String,
}

impl SessionTokens {
    /// Generate two independent random tokens
    pub fn generate() -> Self {
        Self {
            session_token: generate_token(),
            csrf_token: generate_token(),
        }
    }
}

/// 32 random bytes, URL-safe base64 without padding
pub fn generate_token() -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Storage form of a token
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{}{}", TOKEN_HASH_PREFIX, URL_SAFE_NO_PAD.encode(digest))
}

/// Check a presented token against a stored digest
///
/// Empty values never match, on either side.
pub fn token_matches(stored_hash: Option<&str>, presented: &str) -> bool {
    match stored_hash {
        Some(stored) if !stored.is_empty() && !presented.is_empty() => {
            stored == hash_token(presented)
        }
        _ => false,
    }
}

/// Issue a new session for `username`
///
/// Overwrites any prior session of the member, so an older session
/// cookie stops resolving. A digest collision with another member's
/// session is rejected by storage and retried with fresh tokens.
///
/// # Errors
/// `NotFound` if the member does not exist
pub async fn issue_session(db: &Database, username: &str) -> Result<SessionTokens, AppError> {
    for attempt in 1..=MAX_ISSUE_ATTEMPTS {
        let tokens = SessionTokens::generate();
        match db
            .store_session(
                username,
                &hash_token(&tokens.session_token),
                &hash_token(&tokens.csrf_token),
            )
            .await
        {
            Ok(()) => {
                crate::metrics::SESSIONS_ISSUED_TOTAL.inc();
                tracing::info!(username = %username, "Session issued");
                return Ok(tokens);
            }
            Err(AppError::Conflict(_)) => {
                tracing::warn!(attempt, "Session token collision, regenerating");
            }
            Err(error) => return Err(error),
        }
    }

    Err(AppError::Internal(anyhow::anyhow!(
        "could not issue a unique session token"
    )))
}

/// Clear both stored tokens; a no-op when already logged out
pub async fn revoke_session(db: &Database, username: &str) -> Result<(), AppError> {
    db.clear_session(username).await?;
    tracing::info!(username = %username, "Session revoked");
    Ok(())
}

/// Cookie attributes shared by both session cookies
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub max_age_seconds: i64,
    pub secure: bool,
    pub domain: Option<String>,
}

impl CookieSettings {
    pub fn from_config(config: &crate::config::AppConfig) -> Self {
        Self {
            max_age_seconds: config.auth.session_max_age,
            secure: config.should_use_secure_cookies(),
            domain: config.auth.cookie_domain.clone(),
        }
    }

    fn build(&self, name: &'static str, value: String, http_only: bool) -> Cookie<'static> {
        let mut builder = Cookie::build((name, value))
            .path("/")
            .http_only(http_only)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.max_age_seconds));
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        builder.build()
    }

    /// `session_token` (httpOnly) and `csrf_token` (script-readable)
    pub fn session_cookies(&self, tokens: &SessionTokens) -> [Cookie<'static>; 2] {
        [
            self.build(SESSION_COOKIE, tokens.session_token.clone(), true),
            self.build(CSRF_COOKIE, tokens.csrf_token.clone(), false),
        ]
    }

    /// Immediately-expiring replacements for both cookies
    pub fn removal_cookies(&self) -> [Cookie<'static>; 2] {
        let mut session = self.build(SESSION_COOKIE, String::new(), true);
        session.make_removal();
        let mut csrf = self.build(CSRF_COOKIE, String::new(), false);
        csrf.make_removal();
        [session, csrf]
    }
}
