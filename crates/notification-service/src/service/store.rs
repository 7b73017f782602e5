//! 通知存储服务
//!
//! 通知生命周期的业务入口：创建、读取、状态流转。
//!
//! ## 设计说明
//!
//! - **状态流转幂等**：重复标记已读/归档/忽略直接返回当前记录
//! - **归属即存在**：归属不匹配与记录不存在统一返回 NotFound
//! - **未读数缓存**：Redis 缓存未读数，写操作删除缓存键；
//!   缓存故障降级为直查数据库，从不向调用方暴露

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use jobhub_shared::cache::Cache;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::delivery::DeliveryService;
use crate::error::{NotificationError, Result};
use crate::models::{Notification, NotificationType};
use crate::repository::NotificationRepositoryTrait;
use crate::service::dto::{
    CreateNotificationInput, ListFilter, NotificationDetail, NotificationPage, Pagination,
};
use crate::template::TemplateCatalog;

/// 未读数缓存 TTL
const UNREAD_CACHE_TTL: Duration = Duration::from_secs(60);

fn unread_cache_key(recipient_id: &str) -> String {
    format!("notify:unread:{}", recipient_id)
}

/// 通知存储服务
pub struct NotificationStore {
    repo: Arc<dyn NotificationRepositoryTrait>,
    delivery: Arc<DeliveryService>,
    templates: Arc<TemplateCatalog>,
    cache: Option<Arc<Cache>>,
}

impl NotificationStore {
    pub fn new(repo: Arc<dyn NotificationRepositoryTrait>, delivery: Arc<DeliveryService>) -> Self {
        Self {
            repo,
            delivery,
            templates: Arc::new(TemplateCatalog::with_defaults()),
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_templates(mut self, templates: Arc<TemplateCatalog>) -> Self {
        self.templates = templates;
        self
    }

    pub fn templates(&self) -> &TemplateCatalog {
        &self.templates
    }

    /// 创建通知
    ///
    /// 校验通过后落库，随后在后台任务中向外部渠道扇出投递。
    /// 返回时投递可能尚未开始。
    #[instrument(skip(self, input), fields(recipient_id = %input.recipient_id, notification_type = %input.notification_type))]
    pub async fn create(&self, input: CreateNotificationInput) -> Result<Notification> {
        input.validate()?;

        let notification = self.repo.insert(&input).await?;
        self.invalidate_unread(&notification.recipient_id).await;
        metrics::counter!("notifications_created_total").increment(1);

        info!(notification_id = %notification.id, "通知创建成功");

        self.delivery.spawn_dispatch(notification.clone());

        Ok(notification)
    }

    /// 按模板创建通知
    ///
    /// 用模板名查找模板，渲染标题和正文后走常规创建流程。
    /// 渠道列表取自模板定义。
    pub async fn create_from_template(
        &self,
        recipient_id: &str,
        template_name: &str,
        variables: &HashMap<String, String>,
    ) -> Result<Notification> {
        let template = self.templates.get(template_name).ok_or_else(|| {
            NotificationError::invalid("template", format!("未知的模板: {}", template_name))
        })?;

        let (title, message) = self.templates.render(template, variables);

        let mut input =
            CreateNotificationInput::new(recipient_id, template.notification_type, title, message);
        input.channels = template.channels.to_vec();

        self.create(input).await
    }

    /// 获取通知详情（含关联实体投影）
    pub async fn get(&self, recipient_id: &str, id: Uuid) -> Result<NotificationDetail> {
        self.repo
            .get_detail(recipient_id, id)
            .await?
            .ok_or(NotificationError::NotFound)
    }

    /// 分页列表
    ///
    /// 附带总数和当前未读数，便于客户端一次请求拿到角标数据。
    #[instrument(skip(self, filter), fields(recipient_id = %recipient_id, page = pagination.page(), limit = pagination.limit()))]
    pub async fn list(
        &self,
        recipient_id: &str,
        filter: &ListFilter,
        pagination: &Pagination,
    ) -> Result<NotificationPage> {
        let (items, total) = self.repo.list(recipient_id, filter, pagination).await?;
        let unread_count = self.unread_count(recipient_id).await?;

        Ok(NotificationPage {
            items,
            total,
            unread_count,
            page: pagination.page(),
            limit: pagination.limit(),
        })
    }

    /// 未读数
    ///
    /// 优先读缓存，未命中时查库并回填。
    pub async fn unread_count(&self, recipient_id: &str) -> Result<i64> {
        let key = unread_cache_key(recipient_id);

        if let Some(cache) = &self.cache {
            match cache.get::<i64>(&key).await {
                Ok(Some(count)) => {
                    debug!(recipient_id = %recipient_id, count, "未读数缓存命中");
                    return Ok(count);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "读取未读数缓存失败，降级直查数据库");
                }
            }
        }

        let count = self.repo.unread_count(recipient_id).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&key, &count, UNREAD_CACHE_TTL).await {
                warn!(error = %e, "回填未读数缓存失败");
            }
        }

        Ok(count)
    }

    /// 标记已读
    pub async fn mark_as_read(&self, recipient_id: &str, id: Uuid) -> Result<Notification> {
        let notification = self.repo.mark_as_read(recipient_id, id).await?;
        self.invalidate_unread(recipient_id).await;
        Ok(notification)
    }

    /// 归档
    pub async fn archive(&self, recipient_id: &str, id: Uuid) -> Result<Notification> {
        let notification = self.repo.archive(recipient_id, id).await?;
        self.invalidate_unread(recipient_id).await;
        Ok(notification)
    }

    /// 忽略
    pub async fn dismiss(&self, recipient_id: &str, id: Uuid) -> Result<Notification> {
        let notification = self.repo.dismiss(recipient_id, id).await?;
        self.invalidate_unread(recipient_id).await;
        Ok(notification)
    }

    /// 软删除
    pub async fn delete(&self, recipient_id: &str, id: Uuid) -> Result<()> {
        self.repo.soft_delete(recipient_id, id).await?;
        self.invalidate_unread(recipient_id).await;
        Ok(())
    }

    /// 批量标记已读，types 为 None 时对全部类型生效
    #[instrument(skip(self), fields(recipient_id = %recipient_id))]
    pub async fn mark_all_as_read(
        &self,
        recipient_id: &str,
        types: Option<Vec<NotificationType>>,
    ) -> Result<u64> {
        let affected = self.repo.mark_all_as_read(recipient_id, &types).await?;
        self.invalidate_unread(recipient_id).await;

        info!(affected, "批量标记已读完成");
        Ok(affected)
    }

    /// 删除未读数缓存
    ///
    /// 缓存不可用时只记录警告。
    async fn invalidate_unread(&self, recipient_id: &str) {
        if let Some(cache) = &self.cache {
            let key = unread_cache_key(recipient_id);
            if let Err(e) = cache.delete(&key).await {
                warn!(error = %e, key = %key, "删除未读数缓存失败");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockNotificationRepositoryTrait;

    fn store_with(repo: MockNotificationRepositoryTrait) -> NotificationStore {
        NotificationStore::new(Arc::new(repo), Arc::new(DeliveryService::with_defaults()))
    }

    fn sample_input() -> CreateNotificationInput {
        CreateNotificationInput::new(
            "user-1",
            NotificationType::NewJobMatch,
            "新职位推荐",
            "有一个匹配的职位等你查看",
        )
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input_without_touching_repo() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_insert().times(0);

        let store = store_with(repo);

        let mut input = sample_input();
        input.title = String::new();
        input.channels.clear();

        let err = store.create(input).await.unwrap_err();
        match err {
            NotificationError::Validation(fields) => {
                assert_eq!(fields.len(), 2);
            }
            other => panic!("预期校验错误，实际: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_persists_and_returns_record() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_insert()
            .times(1)
            .returning(|input| Ok(input.to_notification()));

        let store = store_with(repo);
        let notification = store.create(sample_input()).await.unwrap();

        assert_eq!(notification.recipient_id, "user-1");
        assert!(notification.is_unread());
    }

    #[tokio::test]
    async fn test_create_from_template_renders_patterns() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_insert()
            .times(1)
            .returning(|input| Ok(input.to_notification()));

        let store = store_with(repo);

        let mut variables = HashMap::new();
        variables.insert("job_title".to_string(), "Rust 工程师".to_string());
        variables.insert("company".to_string(), "JobHub".to_string());

        let notification = store
            .create_from_template("user-1", "new_job_match", &variables)
            .await
            .unwrap();

        assert!(notification.message.contains("Rust 工程师"));
        assert!(!notification.message.contains("{{"));
    }

    #[tokio::test]
    async fn test_create_from_template_unknown_name() {
        let repo = MockNotificationRepositoryTrait::new();
        let store = store_with(repo);

        let err = store
            .create_from_template("user-1", "no_such_template", &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_maps_missing_to_not_found() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_get_detail().returning(|_, _| Ok(None));

        let store = store_with(repo);
        let err = store
            .get("user-1", Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::NotFound));
    }

    #[tokio::test]
    async fn test_list_includes_unread_count() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_list().returning(|_, _, _| Ok((vec![], 0)));
        repo.expect_unread_count().returning(|_| Ok(7));

        let store = store_with(repo);
        let page = store
            .list("user-1", &ListFilter::default(), &Pagination::new(1, 20))
            .await
            .unwrap();

        assert_eq!(page.unread_count, 7);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 20);
    }

    #[tokio::test]
    async fn test_mark_all_as_read_returns_affected() {
        let mut repo = MockNotificationRepositoryTrait::new();
        repo.expect_mark_all_as_read()
            .withf(|recipient, types| recipient == "user-1" && types.is_none())
            .returning(|_, _| Ok(3));


        let store = store_with(repo);
        let affected = store.mark_all_as_read("user-1", None).await.unwrap();
        assert_eq!(affected, 3);
    }
}
