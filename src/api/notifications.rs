//! Notification inbox endpoints
//!
//! Every operation is scoped to the caller; another member's
//! notification looks exactly like a missing one.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use super::dto::*;
use super::extract::JsonBody;
use crate::AppState;
use crate::auth::CurrentMember;
use crate::data::Notification;
use crate::error::AppError;
use crate::service::NotificationService;

fn build_notification_service(state: &AppState) -> NotificationService {
    NotificationService::new(state.db.clone())
}

/// GET /api/v1/notification
pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentMember(username): CurrentMember,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<NotificationListResponse>, AppError> {
    let page = build_notification_service(&state)
        .list(&username, query.limit, query.offset, query.unread_only)
        .await?;

    Ok(Json(NotificationListResponse {
        count: page.count,
        data: page.data,
    }))
}

/// GET /api/v1/notification/:id
pub async fn get_notification(
    State(state): State<AppState>,
    CurrentMember(username): CurrentMember,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Notification>>, AppError> {
    let notification = build_notification_service(&state)
        .get(&username, &id)
        .await?;
    Ok(Json(DataResponse { data: notification }))
}

/// PUT /api/v1/notification/:id
pub async fn update_notification(
    State(state): State<AppState>,
    CurrentMember(username): CurrentMember,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<MarkReadRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    build_notification_service(&state)
        .set_read(&username, &id, req.read)
        .await?;
    Ok(Json(MessageResponse::new("Notification updated successfully")))
}

/// PUT /api/v1/notification
pub async fn update_all_notifications(
    State(state): State<AppState>,
    CurrentMember(username): CurrentMember,
    JsonBody(req): JsonBody<MarkReadRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let updated = build_notification_service(&state)
        .set_all_read(&username, req.read)
        .await?;
    tracing::debug!(username = %username, updated, "Bulk notification update");
    Ok(Json(MessageResponse::new(
        "Notifications updated successfully",
    )))
}

/// DELETE /api/v1/notification/:id
pub async fn delete_notification(
    State(state): State<AppState>,
    CurrentMember(username): CurrentMember,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    build_notification_service(&state)
        .delete(&username, &id)
        .await?;
    Ok(Json(MessageResponse::new("Notification deleted successfully")))
}
