//! 通知 API 处理器（管理端）
//!
//! 单条创建、批量创建和模板目录导出，要求 admin 角色。

use axum::{Extension, Json, extract::State};
use tracing::info;
use validator::Validate;

use jobhub_notification::template::MessageTemplate;

use crate::auth::Claims;
use crate::dto::{
    ApiResponse, BulkCreateRequest, BulkCreateResponse, CreateNotificationRequest, NotificationDto,
};
use crate::error::ApiError;
use crate::state::AppState;

/// 创建单条通知
///
/// POST /api/notifications
pub async fn create_notification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateNotificationRequest>,
) -> Result<Json<ApiResponse<NotificationDto>>, ApiError> {
    req.validate()?;

    let mut input = req.into_input();
    input.created_by = Some(claims.sub.clone());
    input.is_auto_generated = false;

    let notification = state.store.create(input).await?;

    info!(
        notification_id = %notification.id,
        operator_id = %claims.sub,
        "Notification created"
    );
    Ok(Json(ApiResponse::success(notification.into())))
}

/// 批量创建通知
///
/// POST /api/notifications/bulk
pub async fn bulk_create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<BulkCreateRequest>,
) -> Result<Json<ApiResponse<BulkCreateResponse>>, ApiError> {
    let inputs = req
        .items
        .into_iter()
        .map(CreateNotificationRequest::into_input)
        .collect();

    let result = state.bulk.ingest(&claims.sub, inputs).await?;

    info!(
        created_count = result.created_count,
        operator_id = %claims.sub,
        "Bulk notifications created"
    );
    Ok(Json(ApiResponse::success(BulkCreateResponse {
        created_count: result.created_count,
        notifications: result
            .notifications
            .into_iter()
            .map(NotificationDto::from)
            .collect(),
    })))
}

/// 模板目录
///
/// GET /api/notifications/templates
pub async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<MessageTemplate>>>, ApiError> {
    let templates = state.store.templates().all().to_vec();
    Ok(Json(ApiResponse::success(templates)))
}
