//! NotificationStore 集成测试
//!
//! 使用真实 PostgreSQL 测试状态流转、归属隔离和互动追踪。
//! 仓储层通过 SQL 的 COALESCE/CASE 实现幂等流转，无法通过纯 mock
//! 覆盖，因此需要集成测试。
//!
//! ## 运行方式
//!
//! ```bash
//! DATABASE_URL=postgres://... \
//!   cargo test --test store_integration -- --ignored
//! ```

use std::sync::Arc;

use jobhub_notification::error::NotificationError;
use jobhub_notification::models::{DeviceInfo, NotificationStatus, NotificationType};
use jobhub_notification::repository::NotificationRepository;
use jobhub_notification::service::dto::{
    CreateNotificationInput, EngagementInput, ListFilter, Pagination,
};
use jobhub_notification::{DeliveryService, EngagementService, NotificationStore};
use sqlx::PgPool;
use uuid::Uuid;

// ==================== 辅助函数 ====================

fn database_url() -> String {
    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests")
}

async fn connect() -> PgPool {
    let pool = PgPool::connect(&database_url())
        .await
        .expect("数据库连接失败");
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("数据库迁移失败");
    pool
}

fn setup_store(pool: &PgPool) -> NotificationStore {
    let repo = Arc::new(NotificationRepository::new(pool.clone()));
    NotificationStore::new(repo, Arc::new(DeliveryService::with_defaults()))
}

/// 每个测试使用独立的接收者 id，避免用例之间互相干扰
fn test_recipient(label: &str) -> String {
    format!("integ-{}-{}", label, Uuid::now_v7())
}

fn sample_input(recipient: &str) -> CreateNotificationInput {
    CreateNotificationInput::new(
        recipient,
        NotificationType::NewJobMatch,
        "新职位推荐",
        "有一个匹配的职位等你查看",
    )
}

// ==================== 用例 ====================

#[tokio::test]
#[ignore]
async fn test_create_then_get_roundtrip() {
    let pool = connect().await;
    let store = setup_store(&pool);
    let recipient = test_recipient("roundtrip");

    let created = store.create(sample_input(&recipient)).await.unwrap();
    assert_eq!(created.status, NotificationStatus::Unread);

    let detail = store.get(&recipient, created.id).await.unwrap();
    assert_eq!(detail.notification.id, created.id);
    assert_eq!(detail.notification.title, "新职位推荐");
}

#[tokio::test]
#[ignore]
async fn test_mark_as_read_is_idempotent() {
    let pool = connect().await;
    let store = setup_store(&pool);
    let recipient = test_recipient("read");

    let created = store.create(sample_input(&recipient)).await.unwrap();

    let first = store.mark_as_read(&recipient, created.id).await.unwrap();
    assert_eq!(first.status, NotificationStatus::Read);
    let read_at = first.read_at.expect("read_at 应该已设置");

    // 重复标记不改变 read_at
    let second = store.mark_as_read(&recipient, created.id).await.unwrap();
    assert_eq!(second.read_at, Some(read_at));
}

#[tokio::test]
#[ignore]
async fn test_archive_preserves_read_state() {
    let pool = connect().await;
    let store = setup_store(&pool);
    let recipient = test_recipient("archive");

    let created = store.create(sample_input(&recipient)).await.unwrap();
    store.mark_as_read(&recipient, created.id).await.unwrap();

    let archived = store.archive(&recipient, created.id).await.unwrap();
    assert_eq!(archived.status, NotificationStatus::Archived);
    assert!(archived.read_at.is_some());
    assert!(archived.archived_at.is_some());
}

#[tokio::test]
#[ignore]
async fn test_mark_as_read_leaves_archived_record_untouched() {
    let pool = connect().await;
    let store = setup_store(&pool);
    let recipient = test_recipient("read-archived");

    // 未读状态直接归档，read_at 保持空
    let created = store.create(sample_input(&recipient)).await.unwrap();
    let archived = store.archive(&recipient, created.id).await.unwrap();
    assert!(archived.read_at.is_none());

    // 归档后标记已读：状态不回退，也不补写 read_at
    let after = store.mark_as_read(&recipient, created.id).await.unwrap();
    assert_eq!(after.status, NotificationStatus::Archived);
    assert!(after.read_at.is_none());
}

#[tokio::test]
#[ignore]
async fn test_other_recipient_sees_not_found() {
    let pool = connect().await;
    let store = setup_store(&pool);
    let owner = test_recipient("owner");
    let stranger = test_recipient("stranger");

    let created = store.create(sample_input(&owner)).await.unwrap();

    // 归属不匹配与不存在的 id 返回同样的错误
    let err = store.get(&stranger, created.id).await.unwrap_err();
    assert!(matches!(err, NotificationError::NotFound));

    let err = store
        .mark_as_read(&stranger, created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NotificationError::NotFound));
}

#[tokio::test]
#[ignore]
async fn test_soft_delete_hides_from_reads() {
    let pool = connect().await;
    let store = setup_store(&pool);
    let recipient = test_recipient("delete");

    let created = store.create(sample_input(&recipient)).await.unwrap();
    store.delete(&recipient, created.id).await.unwrap();

    let err = store.get(&recipient, created.id).await.unwrap_err();
    assert!(matches!(err, NotificationError::NotFound));

    // 重复删除同样报 NotFound（终态）
    let err = store.delete(&recipient, created.id).await.unwrap_err();
    assert!(matches!(err, NotificationError::NotFound));
}

#[tokio::test]
#[ignore]
async fn test_list_default_excludes_archived() {
    let pool = connect().await;
    let store = setup_store(&pool);
    let recipient = test_recipient("list");

    let a = store.create(sample_input(&recipient)).await.unwrap();
    let _b = store.create(sample_input(&recipient)).await.unwrap();
    store.archive(&recipient, a.id).await.unwrap();

    let page = store
        .list(&recipient, &ListFilter::default(), &Pagination::new(1, 20))
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.unread_count, 1);

    // 显式按 archived 过滤时可见
    let filter = ListFilter {
        status: Some(NotificationStatus::Archived),
        ..Default::default()
    };
    let page = store
        .list(&recipient, &filter, &Pagination::new(1, 20))
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
#[ignore]
async fn test_mark_all_as_read_with_type_filter() {
    let pool = connect().await;
    let store = setup_store(&pool);
    let recipient = test_recipient("markall");

    store.create(sample_input(&recipient)).await.unwrap();
    store.create(sample_input(&recipient)).await.unwrap();

    let mut other = sample_input(&recipient);
    other.notification_type = NotificationType::SystemUpdate;
    store.create(other).await.unwrap();

    let affected = store
        .mark_all_as_read(&recipient, Some(vec![NotificationType::NewJobMatch]))
        .await
        .unwrap();
    assert_eq!(affected, 2);
    assert_eq!(store.unread_count(&recipient).await.unwrap(), 1);
}

#[tokio::test]
#[ignore]
async fn test_track_open_first_timestamp_wins() {
    let pool = connect().await;
    let repo = Arc::new(NotificationRepository::new(pool.clone()));
    let store = setup_store(&pool);
    let engagement = EngagementService::new(repo);
    let recipient = test_recipient("open");

    let created = store.create(sample_input(&recipient)).await.unwrap();

    let input = EngagementInput {
        recipient_id: recipient.clone(),
        notification_id: created.id,
        device: DeviceInfo {
            user_agent: Some("Mozilla/5.0".to_string()),
            platform: Some("ios".to_string()),
            ip: None,
        },
        url: None,
    };

    let first = engagement.track_open(&input).await.unwrap();
    let opened_at = first.opened_at.expect("opened_at 应该已设置");

    let mut again = input.clone();
    again.device.platform = Some("android".to_string());
    let second = engagement.track_open(&again).await.unwrap();

    // 时间戳保持首次，设备信息取最近一次
    assert_eq!(second.opened_at, Some(opened_at));
    assert_eq!(
        second.open_device.as_ref().and_then(|d| d.platform.clone()),
        Some("android".to_string())
    );
}
