//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use jobhub_notification::repository::NotificationRepository;
use jobhub_notification::{
    AnalyticsService, BulkIngestService, DeliveryService, EngagementService, NotificationStore,
};
use jobhub_shared::cache::Cache;
use sqlx::PgPool;

use crate::auth::{JwtConfig, JwtManager};

/// Axum 应用共享状态
///
/// 服务实例通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<NotificationStore>,
    pub bulk: Arc<BulkIngestService>,
    pub engagement: Arc<EngagementService>,
    pub analytics: Arc<AnalyticsService>,
    pub jwt_manager: Arc<JwtManager>,
}

impl AppState {
    /// 按连接池和缓存装配全部服务
    pub fn new(pool: PgPool, cache: Option<Arc<Cache>>, jwt_config: JwtConfig) -> Self {
        let repo = Arc::new(NotificationRepository::new(pool));
        let delivery = Arc::new(DeliveryService::with_defaults());

        let mut store = NotificationStore::new(repo.clone(), delivery.clone());
        if let Some(cache) = cache {
            store = store.with_cache(cache);
        }

        Self {
            store: Arc::new(store),
            bulk: Arc::new(BulkIngestService::new(repo.clone(), delivery)),
            engagement: Arc::new(EngagementService::new(repo.clone())),
            analytics: Arc::new(AnalyticsService::new(repo)),
            jwt_manager: Arc::new(JwtManager::new(jwt_config)),
        }
    }
}
