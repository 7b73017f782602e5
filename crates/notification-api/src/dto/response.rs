//! 响应 DTO 定义
//!
//! 所有 REST API 的响应体结构

use chrono::{DateTime, Utc};
use jobhub_notification::models::{
    Notification, NotificationCategory, NotificationChannel, NotificationPriority,
    NotificationStatus, NotificationType,
};
use jobhub_notification::service::dto::{NotificationDetail, NotificationPage, RelatedProjection};
use serde::Serialize;
use uuid::Uuid;

/// API 统一响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    /// 创建成功响应（无数据）
    pub fn success_empty() -> ApiResponse<()> {
        ApiResponse {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: None,
        }
    }
}

/// 通知响应 DTO
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: Uuid,
    pub recipient_id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub category: NotificationCategory,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    pub channels: Vec<NotificationChannel>,
    pub status: NotificationStatus,
    pub related_job_id: Option<String>,
    pub related_application_id: Option<String>,
    pub related_user_id: Option<String>,
    pub related_payment_id: Option<String>,
    pub created_by: Option<String>,
    pub is_auto_generated: bool,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub dismissed_at: Option<DateTime<Utc>>,
    pub opened_at: Option<DateTime<Utc>>,
    pub clicked_at: Option<DateTime<Utc>>,
    pub clicked_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Notification> for NotificationDto {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            recipient_id: n.recipient_id,
            notification_type: n.notification_type,
            category: n.category,
            priority: n.priority,
            title: n.title,
            message: n.message,
            channels: n.channels,
            status: n.status,
            related_job_id: n.related_job_id,
            related_application_id: n.related_application_id,
            related_user_id: n.related_user_id,
            related_payment_id: n.related_payment_id,
            created_by: n.created_by,
            is_auto_generated: n.is_auto_generated,
            scheduled_for: n.scheduled_for,
            expires_at: n.expires_at,
            read_at: n.read_at,
            archived_at: n.archived_at,
            dismissed_at: n.dismissed_at,
            opened_at: n.opened_at,
            clicked_at: n.clicked_at,
            clicked_url: n.clicked_url,
            created_at: n.created_at,
            updated_at: n.updated_at,
        }
    }
}

/// 通知详情 DTO（含关联实体投影）
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDetailDto {
    #[serde(flatten)]
    pub notification: NotificationDto,
    pub related: RelatedProjection,
}

impl From<NotificationDetail> for NotificationDetailDto {
    fn from(detail: NotificationDetail) -> Self {
        Self {
            notification: detail.notification.into(),
            related: detail.related,
        }
    }
}

/// 列表响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    pub items: Vec<NotificationDto>,
    pub total: i64,
    pub unread_count: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl From<NotificationPage> for NotificationListResponse {
    fn from(page: NotificationPage) -> Self {
        let total_pages = if page.limit > 0 {
            (page.total + page.limit - 1) / page.limit
        } else {
            0
        };
        Self {
            items: page.items.into_iter().map(NotificationDto::from).collect(),
            total: page.total,
            unread_count: page.unread_count,
            page: page.page,
            limit: page.limit,
            total_pages,
        }
    }
}

/// 未读数响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

/// 批量已读响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub updated_count: u64,
}

/// 批量创建响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateResponse {
    pub created_count: usize,
    pub notifications: Vec<NotificationDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_computes_total_pages() {
        let page = NotificationPage {
            items: vec![],
            total: 45,
            unread_count: 3,
            page: 1,
            limit: 20,
        };
        let response = NotificationListResponse::from(page);
        assert_eq!(response.total_pages, 3);
    }

    #[test]
    fn test_notification_dto_uses_type_key() {
        let n = Notification::new("user-1", NotificationType::Welcome, "欢迎", "内容");
        let dto = NotificationDto::from(n);
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["type"], "welcome");
        assert_eq!(json["recipientId"], "user-1");
    }
}
