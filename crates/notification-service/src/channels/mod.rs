//! 投递渠道实现
//!
//! 定义投递渠道 trait 并提供各渠道的具体实现。
//!
//! ## 支持的渠道
//!
//! - **Push**: App 推送（如 FCM、APNs）
//! - **Email**: 邮件
//! - **SMS**: 短信
//!
//! in_app 渠道没有对应实现：记录写入即投递完成，用户通过列表接口读取。

mod email;
mod push;
mod sms;

pub use email::EmailChannel;
pub use push::PushChannel;
pub use sms::SmsChannel;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Notification, NotificationChannel};

/// 单渠道投递结果
///
/// 发送失败返回 `DeliveryOutcome::failed` 而非 Err，调用方据此
/// 区分"渠道层面的失败"和"基础设施错误"。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    pub channel: NotificationChannel,
    pub success: bool,
    /// 外部系统消息 ID（成功时）
    pub external_message_id: Option<String>,
    /// 错误信息（失败时）
    pub error: Option<String>,
    /// 发送耗时（毫秒）
    pub duration_ms: u64,
}

impl DeliveryOutcome {
    /// 创建成功结果
    pub fn success(
        channel: NotificationChannel,
        external_message_id: Option<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            channel,
            success: true,
            external_message_id,
            error: None,
            duration_ms,
        }
    }

    /// 创建失败结果
    pub fn failed(
        channel: NotificationChannel,
        error: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            channel,
            success: false,
            external_message_id: None,
            error: Some(error.into()),
            duration_ms,
        }
    }
}

/// 投递渠道 trait
///
/// 所有渠道都需要实现此 trait，提供统一的发送接口。
/// 渠道实现应当是无状态的，便于并发调用。
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// 渠道类型标识
    fn channel_type(&self) -> NotificationChannel;

    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 检查渠道对该通知是否可用
    ///
    /// 在发送前调用，用于判断是否应该跳过此渠道。
    async fn is_available(&self, notification: &Notification) -> bool;

    /// 发送通知
    async fn send(&self, notification: &Notification) -> Result<DeliveryOutcome>;
}

/// 渠道配置
#[derive(Debug, Clone, Default)]
pub struct ChannelConfig {
    /// 是否启用
    pub enabled: bool,
    /// 请求超时（毫秒）
    pub timeout_ms: u64,
    /// API 端点（如有）
    pub endpoint: Option<String>,
    /// API 密钥（如有）
    pub api_key: Option<String>,
}

impl ChannelConfig {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timeout_ms: 5000,
            endpoint: None,
            api_key: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_config_builder() {
        let config = ChannelConfig::new(true)
            .with_endpoint("https://api.example.com")
            .with_api_key("secret-key")
            .with_timeout(3000);

        assert!(config.enabled);
        assert_eq!(config.endpoint, Some("https://api.example.com".to_string()));
        assert_eq!(config.api_key, Some("secret-key".to_string()));
        assert_eq!(config.timeout_ms, 3000);
    }

    #[test]
    fn test_outcome_constructors() {
        let ok = DeliveryOutcome::success(NotificationChannel::Email, Some("mid-1".into()), 12);
        assert!(ok.success);
        assert!(ok.error.is_none());

        let fail = DeliveryOutcome::failed(NotificationChannel::Sms, "配额耗尽", 3);
        assert!(!fail.success);
        assert_eq!(fail.error.as_deref(), Some("配额耗尽"));
    }
}
