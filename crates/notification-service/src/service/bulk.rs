//! 批量摄入服务
//!
//! 管理端批量创建通知的入口。整批先校验后写入，任一条不合法
//! 则整批拒绝，不产生部分写入。

use std::sync::Arc;

use tracing::{info, instrument};

use crate::delivery::DeliveryService;
use crate::error::{FieldError, NotificationError, Result};
use crate::repository::NotificationRepositoryTrait;
use crate::service::dto::{BulkCreateResult, CreateNotificationInput};

/// 单批最大条数
pub const MAX_BATCH_SIZE: usize = 500;

/// 批量摄入服务
pub struct BulkIngestService {
    repo: Arc<dyn NotificationRepositoryTrait>,
    delivery: Arc<DeliveryService>,
}

impl BulkIngestService {
    pub fn new(repo: Arc<dyn NotificationRepositoryTrait>, delivery: Arc<DeliveryService>) -> Self {
        Self { repo, delivery }
    }

    /// 批量创建通知
    ///
    /// 操作者信息统一盖在每条记录上，覆盖入参自带的值。
    /// 全部落库成功后在后台批量投递。
    #[instrument(skip(self, inputs), fields(operator_id = %operator_id, batch_size = inputs.len()))]
    pub async fn ingest(
        &self,
        operator_id: &str,
        mut inputs: Vec<CreateNotificationInput>,
    ) -> Result<BulkCreateResult> {
        if inputs.is_empty() {
            return Err(NotificationError::invalid("items", "批量列表不能为空"));
        }
        if inputs.len() > MAX_BATCH_SIZE {
            return Err(NotificationError::invalid(
                "items",
                format!("单批不能超过 {} 条", MAX_BATCH_SIZE),
            ));
        }

        // 操作者盖章
        for input in &mut inputs {
            input.created_by = Some(operator_id.to_string());
            input.is_auto_generated = false;
        }

        // 整批校验，错误字段带上条目下标
        let mut errors: Vec<FieldError> = Vec::new();
        for (index, input) in inputs.iter().enumerate() {
            if let Err(NotificationError::Validation(fields)) = input.validate() {
                for field in fields {
                    errors.push(FieldError::new(
                        format!("items[{}].{}", index, field.field),
                        field.message,
                    ));
                }
            }
        }
        if !errors.is_empty() {
            return Err(NotificationError::Validation(errors));
        }

        let notifications = self.repo.insert_many(&inputs).await?;
        metrics::counter!("notifications_created_total").increment(notifications.len() as u64);

        info!(created_count = notifications.len(), "批量创建通知成功");

        self.delivery.spawn_dispatch_batch(notifications.clone());

        Ok(BulkCreateResult {
            created_count: notifications.len(),
            notifications,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationType;
    use crate::repository::MockNotificationRepositoryTrait;

    fn service_with(repo: MockNotificationRepositoryTrait) -> BulkIngestService {
        BulkIngestService::new(Arc::new(repo), Arc::new(DeliveryService::with_defaults()))
    }

    fn valid_input(recipient: &str) -> CreateNotificationInput {
        CreateNotificationInput::new(
            recipient,
            NotificationType::SystemUpdate,
            "系统维护公告",
            "今晚 23:00 至次日 1:00 系统维护",
        )
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_insert_many().times(0);

        let service = service_with(repo);
        let err = service.ingest("admin-1", vec![]).await.unwrap_err();
        assert!(matches!(err, NotificationError::Validation(_)));
    }

    #[tokio::test]
    async fn test_one_bad_item_rejects_whole_batch() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_insert_many().times(0);

        let service = service_with(repo);

        let mut bad = valid_input("user-2");
        bad.title = String::new();

        let err = service
            .ingest("admin-1", vec![valid_input("user-1"), bad])
            .await
            .unwrap_err();

        match err {
            NotificationError::Validation(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "items[1].title");
            }
            other => panic!("预期校验错误，实际: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_operator_stamped_on_every_item() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_insert_many()
            .withf(|inputs| {
                inputs
                    .iter()
                    .all(|i| i.created_by.as_deref() == Some("admin-1") && !i.is_auto_generated)
            })
            .returning(|inputs| Ok(inputs.iter().map(|i| i.to_notification()).collect()));

        let service = service_with(repo);
        let result = service
            .ingest("admin-1", vec![valid_input("user-1"), valid_input("user-2")])
            .await
            .unwrap();

        assert_eq!(result.created_count, 2);
    }
}
