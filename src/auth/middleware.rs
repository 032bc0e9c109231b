//! Authentication middleware
//!
//! Resolves the caller from the `session_token` cookie and, for
//! privileged routes, checks the `X-CSRF-Token` header against the
//! member's stored CSRF digest.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, State},
    http::{HeaderMap, Request, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use super::session::{CSRF_HEADER, SESSION_COOKIE, hash_token, token_matches};
use crate::AppState;
use crate::data::Database;
use crate::error::{AppError, AuthError};

/// Member that passed the session and CSRF checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedMember {
    pub username: String,
}

fn session_token(jar: &CookieJar) -> &str {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value())
        .unwrap_or_default()
}

/// Map a session cookie to a username
///
/// Returns `None` when the cookie is absent or empty, or when the
/// digest does not match exactly one member. Never inspects CSRF.
pub async fn resolve_identity(db: &Database, jar: &CookieJar) -> Result<Option<String>, AppError> {
    let token = session_token(jar);
    if token.is_empty() {
        return Ok(None);
    }

    let mut matches = db.find_usernames_by_session_hash(&hash_token(token)).await?;
    if matches.len() != 1 {
        if matches.len() > 1 {
            tracing::warn!(count = matches.len(), "Session digest shared by several members");
        }
        return Ok(None);
    }

    Ok(matches.pop())
}

/// Full check before any privileged mutation
///
/// The CSRF value is read from the header only; the `csrf_token`
/// cookie is sent automatically by browsers and proves nothing.
pub async fn authorize(db: &Database, headers: &HeaderMap) -> Result<AuthenticatedMember, AppError> {
    let jar = CookieJar::from_headers(headers);

    let username = resolve_identity(db, &jar)
        .await?
        .ok_or(AuthError::NoSuchSession)?;

    let member = db
        .get_member(&username)
        .await?
        .ok_or(AuthError::InvalidSession)?;

    if !token_matches(member.session_token_hash.as_deref(), session_token(&jar)) {
        return Err(AuthError::InvalidSession.into());
    }

    let csrf = headers
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !token_matches(member.csrf_token_hash.as_deref(), csrf) {
        return Err(AuthError::InvalidCsrf.into());
    }

    Ok(AuthenticatedMember { username })
}

/// Middleware to require a fully authorized member
///
/// Adds `AuthenticatedMember` to request extensions if valid.
///
/// # Usage
/// ```ignore
/// let protected_routes = Router::new()
///     .route("/post", post(create_post))
///     .route_layer(middleware::from_fn_with_state(state, require_auth));
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let member = authorize(&state.db, request.headers()).await?;
    request.extensions_mut().insert(member);

    Ok(next.run(request).await)
}

/// Extractor for the authorized caller (session and CSRF checked)
#[derive(Debug, Clone)]
pub struct CurrentMember(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentMember
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(member) = parts.extensions.get::<AuthenticatedMember>() {
            return Ok(CurrentMember(member.username.clone()));
        }

        let state = AppState::from_ref(state);
        let member = authorize(&state.db, &parts.headers).await?;
        parts.extensions.insert(member.clone());

        Ok(CurrentMember(member.username))
    }
}
