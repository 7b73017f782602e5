//! 请求 DTO 定义
//!
//! 所有 REST API 的请求参数和请求体结构

use chrono::{DateTime, Utc};
use jobhub_notification::models::{
    AnalyticsGroupBy, DeviceInfo, NotificationCategory, NotificationChannel, NotificationPriority,
    NotificationStatus, NotificationType,
};
use jobhub_notification::service::dto::CreateNotificationInput;
use serde::Deserialize;
use validator::Validate;

/// 通知列表查询参数
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<NotificationStatus>,
    #[serde(rename = "type")]
    pub notification_type: Option<NotificationType>,
    pub priority: Option<NotificationPriority>,
    #[serde(default)]
    pub unread_only: bool,
}

/// 创建通知请求（管理端）
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    #[validate(length(min = 1, message = "接收者不能为空"))]
    pub recipient_id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub category: Option<NotificationCategory>,
    pub priority: Option<NotificationPriority>,
    #[validate(length(min = 1, max = 200, message = "标题长度必须在1-200个字符之间"))]
    pub title: String,
    #[validate(length(min = 1, max = 1000, message = "正文长度必须在1-1000个字符之间"))]
    pub message: String,
    pub channels: Option<Vec<NotificationChannel>>,
    pub related_job_id: Option<String>,
    pub related_application_id: Option<String>,
    pub related_user_id: Option<String>,
    pub related_payment_id: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateNotificationRequest {
    /// 转换为服务层入参
    ///
    /// 服务层还会做完整校验，这里只做字段映射。
    pub fn into_input(self) -> CreateNotificationInput {
        let mut input = CreateNotificationInput::new(
            self.recipient_id,
            self.notification_type,
            self.title,
            self.message,
        );
        if let Some(category) = self.category {
            input.category = category;
        }
        if let Some(priority) = self.priority {
            input.priority = priority;
        }
        if let Some(channels) = self.channels {
            input.channels = channels;
        }
        input.related_job_id = self.related_job_id;
        input.related_application_id = self.related_application_id;
        input.related_user_id = self.related_user_id;
        input.related_payment_id = self.related_payment_id;
        input.scheduled_for = self.scheduled_for;
        input.expires_at = self.expires_at;
        input
    }
}

/// 批量创建请求（管理端）
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateRequest {
    #[validate(nested)]
    pub items: Vec<CreateNotificationRequest>,
}

/// 批量已读请求
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadRequest {
    /// 限定的类型集合，缺省对全部类型生效
    pub types: Option<Vec<NotificationType>>,
}

/// 上报的设备信息
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfoRequest {
    pub user_agent: Option<String>,
    pub platform: Option<String>,
    pub ip: Option<String>,
}

impl DeviceInfoRequest {
    pub fn into_model(self) -> DeviceInfo {
        DeviceInfo {
            user_agent: self.user_agent,
            platform: self.platform,
            ip: self.ip,
        }
    }
}

/// 打开事件请求
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TrackOpenRequest {
    #[serde(default)]
    pub device: DeviceInfoRequest,
}

/// 点击事件请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackClickRequest {
    pub url: String,
    #[serde(default)]
    pub device: DeviceInfoRequest,
}

/// 统计查询参数（管理端）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default = "default_group_by")]
    pub group_by: AnalyticsGroupBy,
}

fn default_group_by() -> AnalyticsGroupBy {
    AnalyticsGroupBy::Day
}

/// 投递统计查询参数（管理端）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStatsQuery {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_accepts_type_alias() {
        let query: ListNotificationsQuery =
            serde_json::from_str(r#"{"type":"new_job_match","unreadOnly":true}"#).unwrap();
        assert_eq!(
            query.notification_type,
            Some(NotificationType::NewJobMatch)
        );
        assert!(query.unread_only);
    }

    #[test]
    fn test_create_request_maps_to_input() {
        let request: CreateNotificationRequest = serde_json::from_str(
            r#"{
                "recipientId": "user-1",
                "type": "system_update",
                "title": "维护公告",
                "message": "今晚维护",
                "channels": ["in_app", "email"],
                "priority": "high"
            }"#,
        )
        .unwrap();

        let input = request.into_input();
        assert_eq!(input.recipient_id, "user-1");
        assert_eq!(input.priority, NotificationPriority::High);
        assert_eq!(input.channels.len(), 2);
    }

    #[test]
    fn test_analytics_query_defaults_to_day() {
        let query: AnalyticsQuery = serde_json::from_str(
            r#"{"startDate":"2026-08-01T00:00:00Z","endDate":"2026-08-30T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(query.group_by, AnalyticsGroupBy::Day);
    }
}
