//! SMS 短信投递渠道
//!
//! 当前为模拟实现，生产环境需要接入短信服务商。
//! 短信有长度限制，正文超长时截断发送。

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ChannelConfig, DeliveryChannel, DeliveryOutcome};
use crate::error::Result;
use crate::models::{Notification, NotificationChannel};

/// 短信正文长度上限（字符数）
const SMS_MAX_CHARS: usize = 70;

/// SMS 短信投递渠道
pub struct SmsChannel {
    config: ChannelConfig,
}

impl SmsChannel {
    pub fn new(config: ChannelConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ChannelConfig::new(true).with_timeout(5000))
    }

    /// 构建短信正文：标题 + 截断后的正文
    fn build_sms_text(notification: &Notification) -> String {
        let text = format!("【JobHub】{}：{}", notification.title, notification.message);
        if text.chars().count() <= SMS_MAX_CHARS {
            return text;
        }
        let truncated: String = text.chars().take(SMS_MAX_CHARS - 3).collect();
        format!("{truncated}...")
    }

    /// 模拟发送短信
    async fn send_sms(&self, notification: &Notification) -> Result<String> {
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;

        let text = Self::build_sms_text(notification);

        debug!(
            notification_id = %notification.id,
            recipient_id = %notification.recipient_id,
            text_chars = text.chars().count(),
            "SMS 发送中..."
        );

        #[cfg(test)]
        if notification.recipient_id.contains("fail_sms") {
            return Err(crate::error::NotificationError::Channel {
                channel: "sms".to_string(),
                message: "模拟 SMS 发送失败".to_string(),
            });
        }

        Ok(format!("sms_{}", Uuid::new_v4()))
    }
}

#[async_trait]
impl DeliveryChannel for SmsChannel {
    fn channel_type(&self) -> NotificationChannel {
        NotificationChannel::Sms
    }

    fn name(&self) -> &str {
        "sms"
    }

    async fn is_available(&self, _notification: &Notification) -> bool {
        self.config.enabled
    }

    async fn send(&self, notification: &Notification) -> Result<DeliveryOutcome> {
        let start = Instant::now();

        match self.send_sms(notification).await {
            Ok(message_id) => {
                info!(
                    notification_id = %notification.id,
                    message_id = %message_id,
                    "SMS 发送成功"
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
