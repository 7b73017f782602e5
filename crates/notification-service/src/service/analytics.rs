//! 统计聚合服务
//!
//! 管理端的时间桶统计和按渠道的投递统计。只读，不触达缓存。

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::instrument;

use crate::error::{NotificationError, Result};
use crate::models::AnalyticsGroupBy;
use crate::repository::NotificationRepositoryTrait;
use crate::service::dto::{AnalyticsBucket, ChannelDeliveryStats};

/// 统计窗口上限（天）
const MAX_RANGE_DAYS: i64 = 366;

/// 统计聚合服务
pub struct AnalyticsService {
    repo: Arc<dyn NotificationRepositoryTrait>,
}

impl AnalyticsService {
    pub fn new(repo: Arc<dyn NotificationRepositoryTrait>) -> Self {
        Self { repo }
    }

    fn validate_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
        if end <= start {
            return Err(NotificationError::invalid(
                "endDate",
                "结束时间必须晚于开始时间",
            ));
        }
        if end - start > Duration::days(MAX_RANGE_DAYS) {
            return Err(NotificationError::invalid(
                "endDate",
                format!("统计窗口不能超过 {} 天", MAX_RANGE_DAYS),
            ));
        }
        Ok(())
    }

    /// 时间桶统计
    ///
    /// 按创建时间分桶，桶内给出总数及按类型、按状态的计数。
    #[instrument(skip(self), fields(%start, %end, group_by = group_by.date_trunc_field()))]
    pub async fn buckets(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        group_by: AnalyticsGroupBy,
    ) -> Result<Vec<AnalyticsBucket>> {
        Self::validate_range(start, end)?;
        self.repo.analytics_buckets(start, end, group_by).await
    }

    /// 按渠道的投递统计
    #[instrument(skip(self), fields(%start, %end))]
    pub async fn delivery_stats(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ChannelDeliveryStats>> {
        Self::validate_range(start, end)?;
        self.repo.delivery_stats(start, end).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockNotificationRepositoryTrait;

    #[tokio::test]
    async fn test_inverted_range_rejected() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_analytics_buckets().times(0);

        let service = AnalyticsService::new(Arc::new(repo));
        let now = Utc::now();
        let err = service
            .buckets(now, now - Duration::hours(1), AnalyticsGroupBy::Day)
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::Validation(_)));
    }

    #[tokio::test]
    async fn test_oversized_range_rejected() {
        let repo = MockNotificationRepositoryTrait::new();
        let service = AnalyticsService::new(Arc::new(repo));

        let end = Utc::now();
        let start = end - Duration::days(400);
        let err = service.delivery_stats(start, end).await.unwrap_err();
        assert!(matches!(err, NotificationError::Validation(_)));
    }

    #[tokio::test]
    async fn test_valid_range_delegates_to_repo() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_analytics_buckets()
            .times(1)
            .returning(|_, _, _| Ok(vec![]));

        let service = AnalyticsService::new(Arc::new(repo));
        let end = Utc::now();
        let buckets = service
            .buckets(end - Duration::days(7), end, AnalyticsGroupBy::Week)
            .await
            .unwrap();
        assert!(buckets.is_empty());
    }
}
