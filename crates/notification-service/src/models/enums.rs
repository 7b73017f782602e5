//! 通知服务枚举类型定义
//!
//! 所有枚举都是封闭集合，同时支持数据库（sqlx）和 JSON（serde）序列化。
//! 校验边界上出现集合之外的值一律拒绝，而不是透传字符串。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 通知类型
///
/// 区分通知的业务来源，用于筛选和统计分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum NotificationType {
    /// 投递状态变更 - 申请被查看/通过/拒绝
    ApplicationStatusChanged,
    /// 新职位匹配 - 推荐引擎命中
    NewJobMatch,
    /// 面试安排 - 面试邀约或时间变更
    InterviewScheduled,
    /// 支付结果 - 订单支付成功或失败
    PaymentOutcome,
    /// 安全告警 - 异地登录、密码变更等
    SecurityAlert,
    /// 系统公告 - 平台级消息
    SystemUpdate,
    /// 欢迎消息 - 注册后首条通知
    Welcome,
    /// 账号验证
    Verification,
    /// 密码重置
    PasswordReset,
}

impl NotificationType {
    /// 所有合法类型（用于校验提示和统计遍历）
    pub const ALL: [NotificationType; 9] = [
        Self::ApplicationStatusChanged,
        Self::NewJobMatch,
        Self::InterviewScheduled,
        Self::PaymentOutcome,
        Self::SecurityAlert,
        Self::SystemUpdate,
        Self::Welcome,
        Self::Verification,
        Self::PasswordReset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApplicationStatusChanged => "application_status_changed",
            Self::NewJobMatch => "new_job_match",
            Self::InterviewScheduled => "interview_scheduled",
            Self::PaymentOutcome => "payment_outcome",
            Self::SecurityAlert => "security_alert",
            Self::SystemUpdate => "system_update",
            Self::Welcome => "welcome",
            Self::Verification => "verification",
            Self::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("未知的通知类型: {}", s))
    }
}

/// 通知分类（语气/严重程度）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum NotificationCategory {
    #[default]
    Info,
    Success,
    Warning,
    Error,
    Alert,
}

/// 通知优先级
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum NotificationPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// 投递渠道
///
/// in_app 渠道没有外部提供方，记录本身的存在即为"投递完成"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Push,
    Email,
    Sms,
    InApp,
}

impl NotificationChannel {
    pub const ALL: [NotificationChannel; 4] = [Self::Push, Self::Email, Self::Sms, Self::InApp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Email => "email",
            Self::Sms => "sms",
            Self::InApp => "in_app",
        }
    }

    /// 是否需要外部提供方投递
    pub fn requires_provider(&self) -> bool {
        !matches!(self, Self::InApp)
    }
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| format!("未知的投递渠道: {}", s))
    }
}

/// 通知生命周期状态
///
/// 初始状态 unread；read/archived/dismissed 由所有者触发；
/// deleted 为软删除终态，没有出边。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum NotificationStatus {
    #[default]
    Unread,
    Read,
    Archived,
    Dismissed,
    Deleted,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Read => "read",
            Self::Archived => "archived",
            Self::Dismissed => "dismissed",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 统计分桶粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsGroupBy {
    Day,
    Week,
    Month,
}

impl AnalyticsGroupBy {
    /// 对应的 date_trunc 精度字面量
    ///
    /// 封闭枚举保证了拼入 SQL 的字符串只可能是这三个值
    pub fn date_trunc_field(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}
