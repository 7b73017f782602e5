//! App 推送投递渠道
//!
//! 当前为模拟实现，生产环境需要接入 FCM/APNs。
//! 高优先级通知在推送载荷里标记为即时送达。

use std::time::Instant;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ChannelConfig, DeliveryChannel, DeliveryOutcome};
use crate::error::Result;
use crate::models::{Notification, NotificationChannel, NotificationPriority};

/// App 推送投递渠道
pub struct PushChannel {
    config: ChannelConfig,
}

impl PushChannel {
    pub fn new(config: ChannelConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ChannelConfig::new(true).with_timeout(5000))
    }

    /// 构建推送载荷
    fn build_payload(notification: &Notification) -> serde_json::Value {
        json!({
            "title": notification.title,
            "body": notification.message,
            "data": {
                "notificationId": notification.id.to_string(),
                "type": notification.notification_type.as_str(),
                "relatedJobId": notification.related_job_id,
                "relatedApplicationId": notification.related_application_id,
            },
            "priority": if notification.priority >= NotificationPriority::High {
                "high"
            } else {
                "normal"
            },
        })
    }

    /// 模拟推送
    async fn send_push(&self, notification: &Notification) -> Result<String> {
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        let payload = Self::build_payload(notification);

        debug!(
            notification_id = %notification.id,
            recipient_id = %notification.recipient_id,
            payload_bytes = payload.to_string().len(),
            "Push 发送中..."
        );

        #[cfg(test)]
        if notification.recipient_id.contains("fail_push") {
            return Err(crate::error::NotificationError::Channel {
                channel: "push".to_string(),
                message: "模拟 Push 发送失败".to_string(),
            });
        }

        Ok(format!("push_{}", Uuid::new_v4()))
    }
}

#[async_trait]
impl DeliveryChannel for PushChannel {
    fn channel_type(&self) -> NotificationChannel {
        NotificationChannel::Push
    }

    fn name(&self) -> &str {
        "push"
    }

    async fn is_available(&self, _notification: &Notification) -> bool {
        self.config.enabled
    }

    async fn send(&self, notification: &Notification) -> Result<DeliveryOutcome> {
        let start = Instant::now();

        match self.send_push(notification).await {
            Ok(message_id) => {
                info!(
                    notification_id = %notification.id,
                    message_id = %message_id,
                    "Push 发送成功"
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

    #[test]
    fn test_payload_marks_high_priority() {
        let notification = Notification::new(
            "user-1",
            NotificationType::SecurityAlert,
            "安全提醒",
            "异地登录",
        )
        .with_priority(NotificationPriority::Urgent);

        let payload = PushChannel::build_payload(&notification);
        assert_eq!(payload["priority"], "high");
    }

    #[tokio::test]
    async fn test_send_failure_becomes_outcome() {
        let channel = PushChannel::with_defaults();
        let notification =
            Notification::new("fail_push_user", NotificationType::NewJobMatch, "t", "m");
        let outcome = channel.send(&notification).await.unwrap();
        assert!(!outcome.success);
    }
}
