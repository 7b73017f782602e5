//! Email 邮件投递渠道
//!
//! 当前为模拟实现，生产环境需要接入真实的邮件服务（如 SendGrid、AWS SES）。

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ChannelConfig, DeliveryChannel, DeliveryOutcome};
use crate::error::Result;
use crate::models::{Notification, NotificationChannel};

/// Email 邮件投递渠道
pub struct EmailChannel {
    config: ChannelConfig,
    /// 发件人地址
    from_address: String,
}

impl EmailChannel {
    pub fn new(config: ChannelConfig, from_address: String) -> Self {
        Self {
            config,
            from_address,
        }
    }

    /// 使用默认配置创建
    pub fn with_defaults() -> Self {
        Self::new(
            ChannelConfig::new(true).with_timeout(10000),
            "noreply@jobhub.example.com".to_string(),
        )
    }

    /// 模拟发送邮件（生产环境应接入真实邮件服务）
    async fn send_email(&self, notification: &Notification) -> Result<String> {
        // 模拟网络延迟
        tokio::time::sleep(tokio::time::Duration::from_millis(30)).await;

        debug!(
            notification_id = %notification.id,
            recipient_id = %notification.recipient_id,
            from = %self.from_address,
            subject = %notification.title,
            "Email 发送中..."
        );

        // 模拟发送失败
        #[cfg(test)]
        if notification.recipient_id.contains("fail_email") {
            return Err(crate::error::NotificationError::Channel {
                channel: "email".to_string(),
                message: "模拟 Email 发送失败".to_string(),
            });
        }

        Ok(format!("email_{}", Uuid::new_v4()))
    }
}

#[async_trait]
impl DeliveryChannel for EmailChannel {
    fn channel_type(&self) -> NotificationChannel {
        NotificationChannel::Email
    }

    fn name(&self) -> &str {
        "email"
    }

    async fn is_available(&self, _notification: &Notification) -> bool {
        self.config.enabled
    }

    async fn send(&self, notification: &Notification) -> Result<DeliveryOutcome> {
        let start = Instant::now();

        match self.send_email(notification).await {
            Ok(message_id) => {
                info!(
                    notification_id = %notification.id,
                    message_id = %message_id,
                    "Email 发送成功"
                );
                Ok(DeliveryOutcome::success(
                    self.channel_type(),
                    Some(message_id),
                    start.elapsed().as_millis() as u64,
                ))
            }
            Err(e) => Ok(DeliveryOutcome::failed(
                self.channel_type(),
                e.to_string(),
                start.elapsed().as_millis() as u64,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationType;

    #[tokio::test]
    async fn test_send_success() {
        let channel = EmailChannel::with_defaults();
        let notification = Notification::new(
            "user-1",
            NotificationType::Welcome,
            "欢迎加入",
            "完善简历可以获得更多匹配",
        );

        let outcome = channel.send(&notification).await.unwrap();
        assert!(outcome.success);
        assert!(outcome.external_message_id.is_some());
    }

    #[tokio::test]
    async fn test_send_failure_is_outcome_not_err() {
        let channel = EmailChannel::with_defaults();
        let notification = Notification::new(
            "fail_email_user",
            NotificationType::Welcome,
            "t",
            "m",
        );

        let outcome = channel.send(&notification).await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn test_disabled_channel_unavailable() {
        let channel = EmailChannel::new(ChannelConfig::new(false), "noreply@x".into());
        let notification = Notification::new("user-1", NotificationType::Welcome, "t", "m");
        assert!(!channel.is_available(&notification).await);
    }
}
