//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试。
//! 所有按接收者隔离的方法都把 recipient_id 作为第一过滤条件，
//! 归属不匹配与记录不存在在返回值上不可区分。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AnalyticsGroupBy, DeviceInfo, Notification, NotificationType};
use crate::service::dto::{
    AnalyticsBucket, ChannelDeliveryStats, CreateNotificationInput, ListFilter,
    NotificationDetail, Pagination,
};

/// 通知仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepositoryTrait: Send + Sync {
    /// 插入单条通知，返回持久化后的完整记录
    async fn insert(&self, input: &CreateNotificationInput) -> Result<Notification>;

    /// 在单个事务内插入一批通知；任一失败则整体回滚
    async fn insert_many(&self, inputs: &[CreateNotificationInput]) -> Result<Vec<Notification>>;

    /// 按 id 获取属于指定接收者且未软删除的记录及关联实体投影
    async fn get_detail(&self, recipient_id: &str, id: Uuid) -> Result<Option<NotificationDetail>>;

    /// 分页列表，返回 (items, total)
    async fn list(
        &self,
        recipient_id: &str,
        filter: &ListFilter,
        pagination: &Pagination,
    ) -> Result<(Vec<Notification>, i64)>;

    /// 未读数（排除已删除/归档/忽略及可见窗口之外的记录）
    async fn unread_count(&self, recipient_id: &str) -> Result<i64>;

    /// 标记已读，幂等；记录不存在或不属于该接收者时返回 NotFound
    async fn mark_as_read(&self, recipient_id: &str, id: Uuid) -> Result<Notification>;

    /// 归档，幂等
    async fn archive(&self, recipient_id: &str, id: Uuid) -> Result<Notification>;

    /// 忽略（已看过且不再展示），幂等
    async fn dismiss(&self, recipient_id: &str, id: Uuid) -> Result<Notification>;

    /// 软删除，终态
    async fn soft_delete(&self, recipient_id: &str, id: Uuid) -> Result<()>;

    /// 批量已读，返回受影响行数；types 为 None 时不限类型
    async fn mark_all_as_read(
        &self,
        recipient_id: &str,
        types: &Option<Vec<NotificationType>>,
    ) -> Result<u64>;

    /// 记录打开事件：首次设置 opened_at，后续仅更新设备信息
    async fn track_open(
        &self,
        recipient_id: &str,
        id: Uuid,
        device: &DeviceInfo,
    ) -> Result<Notification>;

    /// 记录点击事件：首次设置 clicked_at，后续更新设备信息和目标 URL
    async fn track_click(
        &self,
        recipient_id: &str,
        id: Uuid,
        url: &str,
        device: &DeviceInfo,
    ) -> Result<Notification>;

    /// 时间桶统计：按创建时间分桶，桶内按类型和状态计数
    async fn analytics_buckets(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        group_by: AnalyticsGroupBy,
    ) -> Result<Vec<AnalyticsBucket>>;

    /// 按渠道统计窗口内的请求投递/打开/已读数量
    async fn delivery_stats(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ChannelDeliveryStats>>;
}
