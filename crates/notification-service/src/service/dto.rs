//! 服务层数据传输对象
//!
//! 服务入参在进入仓储前完成全部校验，校验失败不会留下任何可见的
//! 部分写入。

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{FieldError, NotificationError, Result};
use crate::models::{
    MESSAGE_MAX_CHARS, Notification, NotificationCategory, NotificationChannel,
    NotificationPriority, NotificationStatus, NotificationType, TITLE_MAX_CHARS,
};

/// 创建通知的入参
#[derive(Debug, Clone)]
pub struct CreateNotificationInput {
    pub recipient_id: String,
    pub notification_type: NotificationType,
    pub category: NotificationCategory,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    pub channels: Vec<NotificationChannel>,
    pub related_job_id: Option<String>,
    pub related_application_id: Option<String>,
    pub related_user_id: Option<String>,
    pub related_payment_id: Option<String>,
    pub created_by: Option<String>,
    pub is_auto_generated: bool,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateNotificationInput {
    /// 便捷构造，其余字段取默认值
    pub fn new(
        recipient_id: impl Into<String>,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            notification_type,
            category: NotificationCategory::default(),
            priority: NotificationPriority::default(),
            title: title.into(),
            message: message.into(),
            channels: vec![NotificationChannel::InApp],
            related_job_id: None,
            related_application_id: None,
            related_user_id: None,
            related_payment_id: None,
            created_by: None,
            is_auto_generated: true,
            scheduled_for: None,
            expires_at: None,
        }
    }

    /// 校验入参，收集所有字段错误后一次性返回
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.recipient_id.trim().is_empty() {
            errors.push(FieldError::new("recipientId", "接收者不能为空"));
        }

        let title_chars = self.title.chars().count();
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "标题不能为空"));
        } else if title_chars > TITLE_MAX_CHARS {
            errors.push(FieldError::new(
                "title",
                format!("标题不能超过 {} 个字符", TITLE_MAX_CHARS),
            ));
        }

        let message_chars = self.message.chars().count();
        if self.message.trim().is_empty() {
            errors.push(FieldError::new("message", "正文不能为空"));
        } else if message_chars > MESSAGE_MAX_CHARS {
            errors.push(FieldError::new(
                "message",
                format!("正文不能超过 {} 个字符", MESSAGE_MAX_CHARS),
            ));
        }

        if self.channels.is_empty() {
            errors.push(FieldError::new("channels", "至少选择一个投递渠道"));
        }

        if let (Some(scheduled), Some(expires)) = (self.scheduled_for, self.expires_at) {
            if expires <= scheduled {
                errors.push(FieldError::new(
                    "expiresAt",
                    "过期时间必须晚于计划投递时间",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(NotificationError::Validation(errors))
        }
    }

    /// 按入参构造内存实体（mock 仓储和测试用）
    pub fn to_notification(&self) -> Notification {
        let mut n = Notification::new(
            self.recipient_id.clone(),
            self.notification_type,
            self.title.clone(),
            self.message.clone(),
        )
        .with_channels(self.channels.clone())
        .with_priority(self.priority)
        .with_category(self.category);

        n.related_job_id = self.related_job_id.clone();
        n.related_application_id = self.related_application_id.clone();
        n.related_user_id = self.related_user_id.clone();
        n.related_payment_id = self.related_payment_id.clone();
        n.created_by = self.created_by.clone();
        n.is_auto_generated = self.is_auto_generated;
        n.scheduled_for = self.scheduled_for;
        n.expires_at = self.expires_at;
        n
    }
}

/// 列表过滤条件
///
/// 不带 status 过滤时，默认输出排除 archived/dismissed/deleted
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub status: Option<NotificationStatus>,
    pub notification_type: Option<NotificationType>,
    pub priority: Option<NotificationPriority>,
    pub unread_only: bool,
}

/// 列表分页上限
pub const MAX_PAGE_SIZE: i64 = 50;
/// 列表默认页大小
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// 分页参数
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    page: i64,
    limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// 创建分页参数；page 下限 1，limit 无论请求多大都封顶 50
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// 分页查询结果
#[derive(Debug, Clone)]
pub struct NotificationPage {
    pub items: Vec<Notification>,
    pub total: i64,
    pub unread_count: i64,
    pub page: i64,
    pub limit: i64,
}

/// 关联实体投影
///
/// 读取时按声明的字段从协作方集合拉取，弱引用缺失时对应字段为 None
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedProjection {
    pub job_title: Option<String>,
    pub job_company: Option<String>,
    pub application_status: Option<String>,
    pub related_user_name: Option<String>,
    pub related_user_avatar: Option<String>,
    pub creator_name: Option<String>,
}

/// 通知详情（实体 + 关联投影）
#[derive(Debug, Clone)]
pub struct NotificationDetail {
    pub notification: Notification,
    pub related: RelatedProjection,
}

/// 批量创建结果
#[derive(Debug, Clone)]
pub struct BulkCreateResult {
    pub created_count: usize,
    pub notifications: Vec<Notification>,
}

/// 单个时间桶的统计
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsBucket {
    /// 桶起始时间（date_trunc 结果）
    pub bucket: DateTime<Utc>,
    pub total: i64,
    pub by_type: Vec<CountByKey>,
    pub by_status: Vec<CountByKey>,
}

/// 按键聚合的计数
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountByKey {
    pub key: String,
    pub count: i64,
}

/// 单渠道投递统计
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDeliveryStats {
    pub channel: NotificationChannel,
    /// 请求过该渠道的通知数
    pub attempted: i64,
    /// 其中被打开的数量
    pub opened: i64,
    /// 其中被标记已读的数量
    pub read: i64,
}

/// 互动事件入参（track_open / track_click 共用）
#[derive(Debug, Clone)]
pub struct EngagementInput {
    pub recipient_id: String,
    pub notification_id: Uuid,
    pub device: crate::models::DeviceInfo,
    /// 仅 click 事件携带
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_input_passes() {
        let input = CreateNotificationInput::new(
            "user-1",
            NotificationType::Welcome,
            "欢迎加入",
            "完善简历可以获得更多匹配",
        );
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_empty_title_and_message_collected_together() {
        let mut input =
            CreateNotificationInput::new("user-1", NotificationType::Welcome, "", "");
        input.channels = vec![];

        let err = input.validate().unwrap_err();
        match err {
            NotificationError::Validation(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert!(fields.contains(&"title"));
                assert!(fields.contains(&"message"));
                assert!(fields.contains(&"channels"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_title_over_limit() {
        let input = CreateNotificationInput::new(
            "user-1",
            NotificationType::Welcome,
            "标".repeat(TITLE_MAX_CHARS + 1),
            "m",
        );
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_expires_before_scheduled_rejected() {
        let now = Utc::now();
        let mut input =
            CreateNotificationInput::new("user-1", NotificationType::SystemUpdate, "t", "m");
        input.scheduled_for = Some(now);
        input.expires_at = Some(now - chrono::Duration::hours(1));
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_pagination_limit_capped() {
        let p = Pagination::new(2, 500);
        assert_eq!(p.limit(), MAX_PAGE_SIZE);
        assert_eq!(p.offset(), MAX_PAGE_SIZE);

        let p = Pagination::new(0, 0);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 1);
    }
}
