//! 通知实体定义
//!
//! 通知是本子系统唯一的核心实体：一条有生命周期状态的、
//! 定向到单个用户的消息记录。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{
    NotificationCategory, NotificationChannel, NotificationPriority, NotificationStatus,
    NotificationType,
};

/// 标题长度上限（字符数）
pub const TITLE_MAX_CHARS: usize = 200;
/// 正文长度上限（字符数）
pub const MESSAGE_MAX_CHARS: usize = 1000;

/// 设备信息
///
/// 随 open/click 互动事件上报，仅保留最近一次
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub user_agent: Option<String>,
    pub platform: Option<String>,
    pub ip: Option<String>,
}

/// 通知实体
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// 唯一标识，创建后不可变
    pub id: Uuid,
    /// 接收者，所有查询都按此字段隔离
    pub recipient_id: String,
    pub notification_type: NotificationType,
    pub category: NotificationCategory,
    pub priority: NotificationPriority,
    /// 已渲染的标题，非空且不超过 200 字符
    pub title: String,
    /// 已渲染的正文，非空且不超过 1000 字符
    pub message: String,
    /// 请求投递的渠道集合
    pub channels: Vec<NotificationChannel>,
    pub status: NotificationStatus,

    // 弱引用，仅用于深链展示，不表示所有权
    pub related_job_id: Option<String>,
    pub related_application_id: Option<String>,
    pub related_user_id: Option<String>,
    pub related_payment_id: Option<String>,

    /// 触发者；None 表示系统生成
    pub created_by: Option<String>,
    pub is_auto_generated: bool,

    /// 可见/投递窗口下界
    pub scheduled_for: Option<DateTime<Utc>>,
    /// 可见/投递窗口上界，两者都存在时必须晚于 scheduled_for
    pub expires_at: Option<DateTime<Utc>>,

    // 生命周期时间戳，各自只被设置一次
    pub read_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub dismissed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,

    // 互动字段
    pub opened_at: Option<DateTime<Utc>>,
    pub clicked_at: Option<DateTime<Utc>>,
    pub clicked_url: Option<String>,
    pub open_device: Option<DeviceInfo>,
    pub click_device: Option<DeviceInfo>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// 构造一条内存中的新通知（主要用于投递层和测试）
    ///
    /// 持久化路径由仓储的 INSERT RETURNING 负责，这里只提供
    /// 合理的默认值。
    pub fn new(
        recipient_id: impl Into<String>,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            recipient_id: recipient_id.into(),
            notification_type,
            category: NotificationCategory::default(),
            priority: NotificationPriority::default(),
            title: title.into(),
            message: message.into(),
            channels: vec![NotificationChannel::InApp],
            status: NotificationStatus::Unread,
            related_job_id: None,
            related_application_id: None,
            related_user_id: None,
            related_payment_id: None,
            created_by: None,
            is_auto_generated: true,
            scheduled_for: None,
            expires_at: None,
            read_at: None,
            archived_at: None,
            dismissed_at: None,
            deleted_at: None,
            is_deleted: false,
            opened_at: None,
            clicked_at: None,
            clicked_url: None,
            open_device: None,
            click_device: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 设置投递渠道
    pub fn with_channels(mut self, channels: Vec<NotificationChannel>) -> Self {
        self.channels = channels;
        self
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    /// 设置分类
    pub fn with_category(mut self, category: NotificationCategory) -> Self {
        self.category = category;
        self
    }

    /// 是否未读
    pub fn is_unread(&self) -> bool {
        self.read_at.is_none() && !self.is_deleted
    }

    /// 需要外部提供方投递的渠道子集
    pub fn provider_channels(&self) -> Vec<NotificationChannel> {
        self.channels
            .iter()
            .copied()
            .filter(NotificationChannel::requires_provider)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notification_is_unread() {
        let n = Notification::new(
            "user-1",
            NotificationType::Welcome,
            "欢迎加入",
            "完善简历可以获得更多匹配",
        );
        assert_eq!(n.status, NotificationStatus::Unread);
        assert!(n.read_at.is_none());
        assert!(n.is_unread());
    }

    #[test]
    fn test_provider_channels_skips_in_app() {
        let n = Notification::new("user-1", NotificationType::NewJobMatch, "t", "m")
            .with_channels(vec![
                NotificationChannel::InApp,
                NotificationChannel::Email,
                NotificationChannel::Push,
            ]);
        let providers = n.provider_channels();
        assert_eq!(
            providers,
            vec![NotificationChannel::Email, NotificationChannel::Push]
        );
    }
}
