//! 通知 API 处理器（用户侧）
//!
//! 列表、详情、状态流转和互动事件上报。所有查询都以当前
//! 登录用户为接收者，归属不匹配统一返回 404。

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use tracing::info;
use uuid::Uuid;

use jobhub_notification::service::dto::{DEFAULT_PAGE_SIZE, EngagementInput, ListFilter, Pagination};

use crate::auth::Claims;
use crate::dto::{
    ApiResponse, ListNotificationsQuery, MarkAllReadRequest, MarkAllReadResponse,
    NotificationDetailDto, NotificationDto, NotificationListResponse, TrackClickRequest,
    TrackOpenRequest, UnreadCountResponse,
};
use crate::error::ApiError;
use crate::state::AppState;

/// 获取通知列表
///
/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<ApiResponse<NotificationListResponse>>, ApiError> {
    let filter = ListFilter {
        status: query.status,
        notification_type: query.notification_type,
        priority: query.priority,
        unread_only: query.unread_only,
    };
    let pagination = Pagination::new(
        query.page.unwrap_or(1),
        query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    );

    let page = state.store.list(&claims.sub, &filter, &pagination).await?;

    Ok(Json(ApiResponse::success(page.into())))
}

/// 获取未读数
///
/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UnreadCountResponse>>, ApiError> {
    let unread_count = state.store.unread_count(&claims.sub).await?;
    Ok(Json(ApiResponse::success(UnreadCountResponse {
        unread_count,
    })))
}

/// 获取通知详情
///
/// GET /api/notifications/{id}
pub async fn get_notification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NotificationDetailDto>>, ApiError> {
    let detail = state.store.get(&claims.sub, id).await?;
    Ok(Json(ApiResponse::success(detail.into())))
}

/// 标记已读
///
/// PATCH /api/notifications/{id}/read
pub async fn mark_as_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NotificationDto>>, ApiError> {
    let notification = state.store.mark_as_read(&claims.sub, id).await?;
    Ok(Json(ApiResponse::success(notification.into())))
}

/// 归档
///
/// PATCH /api/notifications/{id}/archive
pub async fn archive_notification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NotificationDto>>, ApiError> {
    let notification = state.store.archive(&claims.sub, id).await?;
    Ok(Json(ApiResponse::success(notification.into())))
}

/// 忽略
///
/// PATCH /api/notifications/{id}/dismiss
pub async fn dismiss_notification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NotificationDto>>, ApiError> {
    let notification = state.store.dismiss(&claims.sub, id).await?;
    Ok(Json(ApiResponse::success(notification.into())))
}

/// 批量标记已读
///
/// PATCH /api/notifications/mark-all-read
pub async fn mark_all_as_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Option<Json<MarkAllReadRequest>>,
) -> Result<Json<ApiResponse<MarkAllReadResponse>>, ApiError> {
    let types = body.and_then(|Json(req)| req.types);

    let updated_count = state.store.mark_all_as_read(&claims.sub, types).await?;

    info!(user_id = %claims.sub, updated_count, "Mark all as read");
    Ok(Json(ApiResponse::success(MarkAllReadResponse {
        updated_count,
    })))
}

/// 软删除
///
/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.store.delete(&claims.sub, id).await?;
    Ok(Json(ApiResponse::<()>::success_empty()))
}

/// 上报打开事件
///
/// POST /api/notifications/{id}/track-open
pub async fn track_open(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    body: Option<Json<TrackOpenRequest>>,
) -> Result<Json<ApiResponse<NotificationDto>>, ApiError> {
    let device = body.map(|Json(req)| req.device).unwrap_or_default();

    let input = EngagementInput {
        recipient_id: claims.sub.clone(),
        notification_id: id,
        device: device.into_model(),
        url: None,
    };
    let notification = state.engagement.track_open(&input).await?;
    Ok(Json(ApiResponse::success(notification.into())))
}

/// 上报点击事件
///
/// POST /api/notifications/{id}/track-click
pub async fn track_click(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<TrackClickRequest>,
) -> Result<Json<ApiResponse<NotificationDto>>, ApiError> {
    let input = EngagementInput {
        recipient_id: claims.sub.clone(),
        notification_id: id,
        device: req.device.into_model(),
        url: Some(req.url),
    };
    let notification = state.engagement.track_click(&input).await?;
    Ok(Json(ApiResponse::success(notification.into())))
}
