//! Session authentication
//!
//! Handles:
//! - Session/CSRF token issuance and revocation
//! - Password hashing
//! - Authorization middleware and extractors

mod middleware;
pub mod password;
pub mod session;

pub use middleware::{
    AuthenticatedMember, CurrentMember, authorize, require_auth, resolve_identity,
};
pub use session::{
    CSRF_COOKIE, CSRF_HEADER, CookieSettings, SESSION_COOKIE, SessionTokens, issue_session,
    revoke_session,
};
