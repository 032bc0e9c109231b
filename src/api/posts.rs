//! Post and comment endpoints, including like/dislike

use axum::{
    Json,
    extract::{Path, State},
};

use super::dto::*;
use super::extract::JsonBody;
use crate::AppState;
use crate::auth::CurrentMember;
use crate::data::{Comment, Polarity, Post, ReactionCounts};
use crate::error::AppError;
use crate::service::{PostService, ReactionService};

fn build_post_service(state: &AppState) -> PostService {
    PostService::new(state.db.clone())
}

fn build_reaction_service(state: &AppState) -> ReactionService {
    ReactionService::new(state.db.clone())
}

fn reaction_response(counts: ReactionCounts) -> Json<ReactionResponse> {
    Json(ReactionResponse {
        message: "Action applied successfully".to_string(),
        likes: counts.likes,
        dislikes: counts.dislikes,
    })
}

/// POST /api/v1/post
pub async fn create_post(
    State(state): State<AppState>,
    CurrentMember(username): CurrentMember,
    JsonBody(req): JsonBody<CreatePostRequest>,
) -> Result<Json<CreatedResponse<Post>>, AppError> {
    let post = build_post_service(&state)
        .create_post(&username, req.title, req.content)
        .await?;

    Ok(Json(CreatedResponse {
        message: "Post created successfully".to_string(),
        data: post,
    }))
}

/// GET /api/v1/post/:post_id
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<DataResponse<Post>>, AppError> {
    let post = build_post_service(&state).get_post(&post_id).await?;
    Ok(Json(DataResponse { data: post }))
}

/// PUT /api/v1/post/:post_id/like-dislike
///
/// The action is parsed before any storage access, so an unknown
/// action is rejected even for a missing post.
pub async fn like_or_dislike_post(
    State(state): State<AppState>,
    CurrentMember(username): CurrentMember,
    Path(post_id): Path<String>,
    JsonBody(req): JsonBody<ReactionRequest>,
) -> Result<Json<ReactionResponse>, AppError> {
    let action: Polarity = req.action.parse()?;

    let counts = build_reaction_service(&state)
        .apply_to_post(&username, &post_id, action)
        .await?;

    Ok(reaction_response(counts))
}

/// POST /api/v1/comment/:post_id
pub async fn create_comment(
    State(state): State<AppState>,
    CurrentMember(username): CurrentMember,
    Path(post_id): Path<String>,
    JsonBody(req): JsonBody<CreateCommentRequest>,
) -> Result<Json<CreatedResponse<Comment>>, AppError> {
    let comment = build_post_service(&state)
        .create_comment(&username, &post_id, req.content)
        .await?;

    Ok(Json(CreatedResponse {
        message: "Comment created successfully".to_string(),
        data: comment,
    }))
}

/// GET /api/v1/comment/:post_id/:comment_id
pub async fn get_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<Json<DataResponse<Comment>>, AppError> {
    let comment = build_post_service(&state)
        .get_comment(&post_id, &comment_id)
        .await?;
    Ok(Json(DataResponse { data: comment }))
}

/// PUT /api/v1/comment/:post_id/:comment_id/like-dislike
pub async fn like_or_dislike_comment(
    State(state): State<AppState>,
    CurrentMember(username): CurrentMember,
    Path((post_id, comment_id)): Path<(String, String)>,
    JsonBody(req): JsonBody<ReactionRequest>,
) -> Result<Json<ReactionResponse>, AppError> {
    let action: Polarity = req.action.parse()?;

    let counts = build_reaction_service(&state)
        .apply_to_comment(&username, &post_id, &comment_id, action)
        .await?;

    Ok(reaction_response(counts))
}
