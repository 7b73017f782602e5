//! 互动追踪服务
//!
//! 记录通知的打开和点击事件。首次事件时间戳不被后续事件覆盖，
//! 设备信息总是更新为最近一次上报。

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::{NotificationError, Result};
use crate::models::Notification;
use crate::repository::NotificationRepositoryTrait;
use crate::service::dto::EngagementInput;

/// 互动追踪服务
pub struct EngagementService {
    repo: Arc<dyn NotificationRepositoryTrait>,
}

impl EngagementService {
    pub fn new(repo: Arc<dyn NotificationRepositoryTrait>) -> Self {
        Self { repo }
    }

    /// 记录打开事件
    #[instrument(skip(self, input), fields(recipient_id = %input.recipient_id, notification_id = %input.notification_id))]
    pub async fn track_open(&self, input: &EngagementInput) -> Result<Notification> {
        let notification = self
            .repo
            .track_open(&input.recipient_id, input.notification_id, &input.device)
            .await?;

        debug!("打开事件已记录");
        Ok(notification)
    }

    /// 记录点击事件
    ///
    /// click 必须携带目标 URL。
    #[instrument(skip(self, input), fields(recipient_id = %input.recipient_id, notification_id = %input.notification_id))]
    pub async fn track_click(&self, input: &EngagementInput) -> Result<Notification> {
        let url = match input.url.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => return Err(NotificationError::invalid("url", "点击事件必须携带目标 URL")),
        };

        let notification = self
            .repo
            .track_click(&input.recipient_id, input.notification_id, url, &input.device)
            .await?;

        debug!(url = %url, "点击事件已记录");
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeviceInfo;
    use crate::repository::MockNotificationRepositoryTrait;
    use uuid::Uuid;

    fn input(url: Option<&str>) -> EngagementInput {
        EngagementInput {
            recipient_id: "user-1".to_string(),
            notification_id: Uuid::now_v7(),
            device: DeviceInfo {
                user_agent: Some("Mozilla/5.0".to_string()),
                platform: Some("ios".to_string()),
                ip: Some("203.0.113.7".to_string()),
            },
            url: url.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_click_without_url_rejected() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_track_click().times(0);

        let service = EngagementService::new(Arc::new(repo));
        let err = service.track_click(&input(None)).await.unwrap_err();
        assert!(matches!(err, NotificationError::Validation(_)));
    }

    #[tokio::test]
    async fn test_click_passes_url_and_device_through() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_track_click()
            .withf(|recipient, _, url, device| {
                recipient == "user-1"
                    && url == "https://jobhub.example.com/jobs/42"
                    && device.platform.as_deref() == Some("ios")
            })
            .returning(|recipient, id, url, device| {
                let mut n = Notification::new(
                    recipient,
                    crate::models::NotificationType::NewJobMatch,
                    "t",
                    "m",
                );
                n.id = id;
                n.clicked_at = Some(chrono::Utc::now());
                n.clicked_url = Some(url.to_string());
                n.click_device = Some(device.clone());
                Ok(n)
            });

        let service = EngagementService::new(Arc::new(repo));
        let notification = service
            .track_click(&input(Some("https://jobhub.example.com/jobs/42")))
            .await
            .unwrap();

        assert!(notification.clicked_at.is_some());
        assert_eq!(
            notification.clicked_url.as_deref(),
            Some("https://jobhub.example.com/jobs/42")
        );
    }
}
