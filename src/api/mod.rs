//! API layer
//!
//! HTTP handlers for:
//! - Members, sessions and follows
//! - Posts, comments and reactions
//! - Notifications
//! - Metrics (Prometheus)

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::AppState;
use crate::auth::require_auth;

mod dto;
mod extract;
mod members;
pub mod metrics;
mod notifications;
mod posts;

pub use dto::*;
pub use metrics::metrics_router;

/// Create the `/api/v1` router
///
/// Routes are split into public and authenticated endpoints.
/// Authenticated routes pass the session and CSRF checks in
/// `require_auth` before reaching the handler.
pub fn api_router(state: AppState) -> Router<AppState> {
    // Public endpoints (no authentication required)
    let public_routes = Router::new()
        .route("/register", post(members::register))
        .route("/login", post(members::login))
        .route("/member/:username", get(members::get_member))
        .route("/member/:username/liked-posts", get(members::liked_posts))
        .route(
            "/member/:username/disliked-posts",
            get(members::disliked_posts),
        )
        .route(
            "/member/:username/liked-comments",
            get(members::liked_comments),
        )
        .route(
            "/member/:username/disliked-comments",
            get(members::disliked_comments),
        )
        .route("/member/:username/followers", get(members::followers))
        .route("/member/:username/following", get(members::following))
        .route("/post/:post_id", get(posts::get_post))
        .route("/comment/:post_id/:comment_id", get(posts::get_comment));

    // Authenticated endpoints (require session cookie and CSRF header)
    let authenticated_routes = Router::new()
        .route("/logout", post(members::logout))
        .route("/current-user", get(members::current_user))
        .route(
            "/member",
            put(members::update_member).delete(members::delete_member),
        )
        .route(
            "/member/:username/follow",
            post(members::follow).delete(members::unfollow),
        )
        .route("/post", post(posts::create_post))
        .route(
            "/post/:post_id/like-dislike",
            put(posts::like_or_dislike_post),
        )
        .route("/comment/:post_id", post(posts::create_comment))
        .route(
            "/comment/:post_id/:comment_id/like-dislike",
            put(posts::like_or_dislike_comment),
        )
        .route(
            "/notification",
            get(notifications::list_notifications).put(notifications::update_all_notifications),
        )
        .route(
            "/notification/:id",
            get(notifications::get_notification)
                .put(notifications::update_notification)
                .delete(notifications::delete_notification),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public_routes.merge(authenticated_routes)
}
