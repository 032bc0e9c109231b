//! Member endpoints
//!
//! Registration, login/logout, profiles, follows and reacted-target
//! listings.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::CookieJar;

use super::dto::*;
use super::extract::JsonBody;
use crate::AppState;
use crate::auth::{CookieSettings, CurrentMember, SessionTokens};
use crate::data::{Polarity, TargetKind};
use crate::error::AppError;
use crate::service::{FollowService, MemberService, PostService, ProfileChanges, Registration};

fn build_member_service(state: &AppState) -> MemberService {
    MemberService::new(state.db.clone())
}

fn build_follow_service(state: &AppState) -> FollowService {
    FollowService::new(state.db.clone())
}

fn with_session_cookies(state: &AppState, jar: CookieJar, tokens: &SessionTokens) -> CookieJar {
    let [session, csrf] = CookieSettings::from_config(&state.config).session_cookies(tokens);
    jar.add(session).add(csrf)
}

fn without_session_cookies(state: &AppState, jar: CookieJar) -> CookieJar {
    let [session, csrf] = CookieSettings::from_config(&state.config).removal_cookies();
    jar.add(session).add(csrf)
}

// =============================================================================
// Session lifecycle
// =============================================================================

/// POST /api/v1/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<MessageResponse>), AppError> {
    let (member, tokens) = build_member_service(&state)
        .register(Registration {
            username: req.username,
            email: req.email,
            password: req.password,
            bio: req.bio,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        with_session_cookies(&state, jar, &tokens),
        Json(MessageResponse::new(format!(
            "Successfully registered user: {}",
            member.username
        ))),
    ))
}

/// POST /api/v1/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let tokens = build_member_service(&state)
        .login(&req.username, &req.password)
        .await?;

    Ok((
        with_session_cookies(&state, jar, &tokens),
        Json(MessageResponse::new("Login successful")),
    ))
}

/// POST /api/v1/logout
pub async fn logout(
    State(state): State<AppState>,
    CurrentMember(username): CurrentMember,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    build_member_service(&state).logout(&username).await?;

    Ok((
        without_session_cookies(&state, jar),
        Json(MessageResponse::new("Logout successful")),
    ))
}

/// GET /api/v1/current-user
pub async fn current_user(
    CurrentMember(username): CurrentMember,
) -> Result<Json<CurrentUserResponse>, AppError> {
    Ok(Json(CurrentUserResponse { username }))
}

// =============================================================================
// Profiles
// =============================================================================

/// GET /api/v1/member/:username
pub async fn get_member(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<DataResponse<MemberResponse>>, AppError> {
    let member = build_member_service(&state).get(&username).await?;
    Ok(Json(DataResponse {
        data: member.into(),
    }))
}

/// PUT /api/v1/member
pub async fn update_member(
    State(state): State<AppState>,
    CurrentMember(username): CurrentMember,
    JsonBody(req): JsonBody<UpdateMemberRequest>,
) -> Result<Json<DataResponse<MemberResponse>>, AppError> {
    let member = build_member_service(&state)
        .update(
            &username,
            ProfileChanges {
                email: req.email,
                bio: req.bio,
                current_password: req.current_password,
                new_password: req.new_password,
            },
        )
        .await?;

    Ok(Json(DataResponse {
        data: member.into(),
    }))
}

/// DELETE /api/v1/member
pub async fn delete_member(
    State(state): State<AppState>,
    CurrentMember(username): CurrentMember,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    build_member_service(&state).delete(&username).await?;

    Ok((
        without_session_cookies(&state, jar),
        Json(MessageResponse::new("Member deleted successfully")),
    ))
}

// =============================================================================
// Reacted targets
// =============================================================================

async fn reacted_targets(
    state: &AppState,
    username: &str,
    kind: TargetKind,
    polarity: Polarity,
) -> Result<Json<DataResponse<Vec<String>>>, AppError> {
    let data = PostService::new(state.db.clone())
        .reacted_targets(username, kind, polarity)
        .await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/member/:username/liked-posts
pub async fn liked_posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<DataResponse<Vec<String>>>, AppError> {
    reacted_targets(&state, &username, TargetKind::Post, Polarity::Like).await
}

/// GET /api/v1/member/:username/disliked-posts
pub async fn disliked_posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<DataResponse<Vec<String>>>, AppError> {
    reacted_targets(&state, &username, TargetKind::Post, Polarity::Dislike).await
}

/// GET /api/v1/member/:username/liked-comments
pub async fn liked_comments(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<DataResponse<Vec<String>>>, AppError> {
    reacted_targets(&state, &username, TargetKind::Comment, Polarity::Like).await
}

/// GET /api/v1/member/:username/disliked-comments
pub async fn disliked_comments(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<DataResponse<Vec<String>>>, AppError> {
    reacted_targets(&state, &username, TargetKind::Comment, Polarity::Dislike).await
}

// =============================================================================
// Follows
// =============================================================================

/// POST /api/v1/member/:username/follow
pub async fn follow(
    State(state): State<AppState>,
    CurrentMember(follower): CurrentMember,
    Path(username): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    build_follow_service(&state)
        .follow(&follower, &username)
        .await?;
    Ok(Json(MessageResponse::new("Followed successfully")))
}

/// DELETE /api/v1/member/:username/follow
pub async fn unfollow(
    State(state): State<AppState>,
    CurrentMember(follower): CurrentMember,
    Path(username): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    build_follow_service(&state)
        .unfollow(&follower, &username)
        .await?;
    Ok(Json(MessageResponse::new("Unfollowed successfully")))
}

/// GET /api/v1/member/:username/followers
pub async fn followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<DataResponse<Vec<String>>>, AppError> {
    let data = build_follow_service(&state).followers(&username).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/member/:username/following
pub async fn following(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<DataResponse<Vec<String>>>, AppError> {
    let data = build_follow_service(&state).following(&username).await?;
    Ok(Json(DataResponse { data }))
}
