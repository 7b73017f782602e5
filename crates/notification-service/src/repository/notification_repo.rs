//! 通知仓储
//!
//! 基于 sqlx 的 PostgreSQL 实现。状态转换全部用单条 UPDATE 的
//! COALESCE/CASE 表达幂等语义，并发重复调用不会报错也不会把
//! 时间戳覆盖成新值。

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use super::traits::NotificationRepositoryTrait;
use crate::error::{NotificationError, Result};
use crate::models::{
    AnalyticsGroupBy, DeviceInfo, Notification, NotificationCategory, NotificationChannel,
    NotificationPriority, NotificationStatus, NotificationType,
};
use crate::service::dto::{
    AnalyticsBucket, ChannelDeliveryStats, CountByKey, CreateNotificationInput, ListFilter,
    NotificationDetail, Pagination, RelatedProjection,
};

/// notifications 表的完整列清单，查询和 RETURNING 共用
const COLUMNS: &str = "id, recipient_id, notification_type, category, priority, title, message, \
     channels, status, related_job_id, related_application_id, related_user_id, \
     related_payment_id, created_by, is_auto_generated, scheduled_for, expires_at, \
     read_at, archived_at, dismissed_at, deleted_at, is_deleted, \
     opened_at, clicked_at, clicked_url, open_device, click_device, created_at, updated_at";

/// 数据库行结构
#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    recipient_id: String,
    notification_type: NotificationType,
    category: NotificationCategory,
    priority: NotificationPriority,
    title: String,
    message: String,
    channels: Vec<String>,
    status: NotificationStatus,
    related_job_id: Option<String>,
    related_application_id: Option<String>,
    related_user_id: Option<String>,
    related_payment_id: Option<String>,
    created_by: Option<String>,
    is_auto_generated: bool,
    scheduled_for: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    read_at: Option<DateTime<Utc>>,
    archived_at: Option<DateTime<Utc>>,
    dismissed_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
    is_deleted: bool,
    opened_at: Option<DateTime<Utc>>,
    clicked_at: Option<DateTime<Utc>>,
    clicked_url: Option<String>,
    open_device: Option<Json<DeviceInfo>>,
    click_device: Option<Json<DeviceInfo>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl NotificationRow {
    /// 转换为领域模型；渠道列为 TEXT[]，集合外的值视为数据损坏
    fn into_model(self) -> Result<Notification> {
        let channels = self
            .channels
            .iter()
            .map(|s| NotificationChannel::from_str(s))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(NotificationError::Internal)?;

        Ok(Notification {
            id: self.id,
            recipient_id: self.recipient_id,
            notification_type: self.notification_type,
            category: self.category,
            priority: self.priority,
            title: self.title,
            message: self.message,
            channels,
            status: self.status,
            related_job_id: self.related_job_id,
            related_application_id: self.related_application_id,
            related_user_id: self.related_user_id,
            related_payment_id: self.related_payment_id,
            created_by: self.created_by,
            is_auto_generated: self.is_auto_generated,
            scheduled_for: self.scheduled_for,
            expires_at: self.expires_at,
            read_at: self.read_at,
            archived_at: self.archived_at,
            dismissed_at: self.dismissed_at,
            deleted_at: self.deleted_at,
            is_deleted: self.is_deleted,
            opened_at: self.opened_at,
            clicked_at: self.clicked_at,
            clicked_url: self.clicked_url,
            open_device: self.open_device.map(|j| j.0),
            click_device: self.click_device.map(|j| j.0),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// 详情行（实体 + 关联投影）
#[derive(sqlx::FromRow)]
struct DetailRow {
    #[sqlx(flatten)]
    notification: NotificationRow,
    job_title: Option<String>,
    job_company: Option<String>,
    application_status: Option<String>,
    related_user_name: Option<String>,
    related_user_avatar: Option<String>,
    creator_name: Option<String>,
}

/// 时间桶计数行
#[derive(sqlx::FromRow)]
struct BucketCountRow {
    bucket: DateTime<Utc>,
    key: String,
    count: i64,
}

/// 通知仓储
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在指定执行器上插入一条记录（供单条和批量路径共用）
    async fn insert_row<'e, E>(executor: E, input: &CreateNotificationInput) -> Result<NotificationRow>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let channels: Vec<String> = input
            .channels
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();

        let sql = format!(
            r#"
            INSERT INTO notifications (
                id, recipient_id, notification_type, category, priority, title, message,
                channels, status, related_job_id, related_application_id, related_user_id,
                related_payment_id, created_by, is_auto_generated, scheduled_for, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'unread', $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(Uuid::now_v7())
            .bind(&input.recipient_id)
            .bind(input.notification_type)
            .bind(input.category)
            .bind(input.priority)
            .bind(&input.title)
            .bind(&input.message)
            .bind(&channels)
            .bind(&input.related_job_id)
            .bind(&input.related_application_id)
            .bind(&input.related_user_id)
            .bind(&input.related_payment_id)
            .bind(&input.created_by)
            .bind(input.is_auto_generated)
            .bind(input.scheduled_for)
            .bind(input.expires_at)
            .fetch_one(executor)
            .await?;

        Ok(row)
    }
}

#[async_trait]
impl NotificationRepositoryTrait for NotificationRepository {
    async fn insert(&self, input: &CreateNotificationInput) -> Result<Notification> {
        let row = Self::insert_row(&self.pool, input).await?;
        row.into_model()
    }

    async fn insert_many(&self, inputs: &[CreateNotificationInput]) -> Result<Vec<Notification>> {
        let mut tx = self.pool.begin().await?;

        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            let row = Self::insert_row(&mut *tx, input).await?;
            created.push(row.into_model()?);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn get_detail(
        &self,
        recipient_id: &str,
        id: Uuid,
    ) -> Result<Option<NotificationDetail>> {
        // 投影契约：只拉取各协作方声明的展示字段
        let prefixed = COLUMNS
            .split(", ")
            .map(|c| format!("n.{c}"))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            r#"
            SELECT {prefixed},
                   j.title AS job_title,
                   j.company_name AS job_company,
                   a.status AS application_status,
                   u.display_name AS related_user_name,
                   u.avatar_url AS related_user_avatar,
                   c.display_name AS creator_name
            FROM notifications n
            LEFT JOIN jobs j ON j.id = n.related_job_id
            LEFT JOIN applications a ON a.id = n.related_application_id
            LEFT JOIN users u ON u.id = n.related_user_id
            LEFT JOIN users c ON c.id = n.created_by
            WHERE n.id = $1 AND n.recipient_id = $2 AND n.is_deleted = FALSE
            "#
        );

        let row = sqlx::query_as::<_, DetailRow>(&sql)
            .bind(id)
            .bind(recipient_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(detail) => Ok(Some(NotificationDetail {
                notification: detail.notification.into_model()?,
                related: RelatedProjection {
                    job_title: detail.job_title,
                    job_company: detail.job_company,
                    application_status: detail.application_status,
                    related_user_name: detail.related_user_name,
                    related_user_avatar: detail.related_user_avatar,
                    creator_name: detail.creator_name,
                },
            })),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        recipient_id: &str,
        filter: &ListFilter,
        pagination: &Pagination,
    ) -> Result<(Vec<Notification>, i64)> {
        // $2 为空时走默认列表：排除 archived/dismissed（deleted 永远排除）
        let where_clause = r#"
            WHERE recipient_id = $1
              AND is_deleted = FALSE
              AND ($2::varchar IS NULL OR status = $2)
              AND ($2::varchar IS NOT NULL OR status IN ('unread', 'read'))
              AND ($3::varchar IS NULL OR notification_type = $3)
              AND ($4::varchar IS NULL OR priority = $4)
              AND (NOT $5 OR read_at IS NULL)
              AND (scheduled_for IS NULL OR scheduled_for <= NOW())
              AND (expires_at IS NULL OR expires_at > NOW())
        "#;

        let list_sql = format!(
            "SELECT {COLUMNS} FROM notifications {where_clause} \
             ORDER BY created_at DESC LIMIT $6 OFFSET $7"
        );

        let rows = sqlx::query_as::<_, NotificationRow>(&list_sql)
            .bind(recipient_id)
            .bind(filter.status)
            .bind(filter.notification_type)
            .bind(filter.priority)
            .bind(filter.unread_only)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM notifications {where_clause}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(recipient_id)
            .bind(filter.status)
            .bind(filter.notification_type)
            .bind(filter.priority)
            .bind(filter.unread_only)
            .fetch_one(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(NotificationRow::into_model)
            .collect::<Result<Vec<_>>>()?;

        Ok((items, total))
    }

    async fn unread_count(&self, recipient_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM notifications
            WHERE recipient_id = $1
              AND is_deleted = FALSE
              AND read_at IS NULL
              AND archived_at IS NULL
              AND dismissed_at IS NULL
              AND (scheduled_for IS NULL OR scheduled_for <= NOW())
              AND (expires_at IS NULL OR expires_at > NOW())
            "#,
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn mark_as_read(&self, recipient_id: &str, id: Uuid) -> Result<Notification> {
        let sql = format!(
            r#"
            UPDATE notifications
            SET read_at = CASE
                    WHEN status IN ('unread', 'read') THEN COALESCE(read_at, NOW())
                    ELSE read_at
                END,
                status = CASE WHEN status = 'unread' THEN 'read' ELSE status END,
                updated_at = NOW()
            WHERE id = $1 AND recipient_id = $2 AND is_deleted = FALSE
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(id)
            .bind(recipient_id)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(NotificationError::NotFound)?.into_model()
    }

    async fn archive(&self, recipient_id: &str, id: Uuid) -> Result<Notification> {
        let sql = format!(
            r#"
            UPDATE notifications
            SET archived_at = CASE
                    WHEN status IN ('unread', 'read') AND archived_at IS NULL THEN NOW()
                    ELSE archived_at
                END,
                status = CASE WHEN status IN ('unread', 'read') THEN 'archived' ELSE status END,
                updated_at = NOW()
            WHERE id = $1 AND recipient_id = $2 AND is_deleted = FALSE
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(id)
            .bind(recipient_id)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(NotificationError::NotFound)?.into_model()
    }

    async fn dismiss(&self, recipient_id: &str, id: Uuid) -> Result<Notification> {
        let sql = format!(
            r#"
            UPDATE notifications
            SET dismissed_at = CASE
                    WHEN status IN ('unread', 'read') AND dismissed_at IS NULL THEN NOW()
                    ELSE dismissed_at
                END,
                status = CASE WHEN status IN ('unread', 'read') THEN 'dismissed' ELSE status END,
                updated_at = NOW()
            WHERE id = $1 AND recipient_id = $2 AND is_deleted = FALSE
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(id)
            .bind(recipient_id)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(NotificationError::NotFound)?.into_model()
    }

    async fn soft_delete(&self, recipient_id: &str, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_deleted = TRUE,
                deleted_at = COALESCE(deleted_at, NOW()),
                status = 'deleted',
                updated_at = NOW()
            WHERE id = $1 AND recipient_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(NotificationError::NotFound);
        }
        Ok(())
    }

    async fn mark_all_as_read(
        &self,
        recipient_id: &str,
        types: &Option<Vec<NotificationType>>,
    ) -> Result<u64> {
        let type_names: Option<Vec<String>> = types
            .as_ref()
            .map(|ts| ts.iter().map(|t| t.as_str().to_string()).collect());

        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET read_at = NOW(), status = 'read', updated_at = NOW()
            WHERE recipient_id = $1
              AND is_deleted = FALSE
              AND status = 'unread'
              AND read_at IS NULL
              AND ($2::varchar[] IS NULL OR notification_type = ANY($2))
            "#,
        )
        .bind(recipient_id)
        .bind(type_names)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn track_open(
        &self,
        recipient_id: &str,
        id: Uuid,
        device: &DeviceInfo,
    ) -> Result<Notification> {
        let sql = format!(
            r#"
            UPDATE notifications
            SET opened_at = COALESCE(opened_at, NOW()),
                open_device = $3,
                updated_at = NOW()
            WHERE id = $1 AND recipient_id = $2 AND is_deleted = FALSE
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(id)
            .bind(recipient_id)
            .bind(Json(device))
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(NotificationError::NotFound)?.into_model()
    }

    async fn track_click(
        &self,
        recipient_id: &str,
        id: Uuid,
        url: &str,
        device: &DeviceInfo,
    ) -> Result<Notification> {
        let sql = format!(
            r#"
            UPDATE notifications
            SET clicked_at = COALESCE(clicked_at, NOW()),
                clicked_url = $3,
                click_device = $4,
                updated_at = NOW()
            WHERE id = $1 AND recipient_id = $2 AND is_deleted = FALSE
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(id)
            .bind(recipient_id)
            .bind(url)
            .bind(Json(device))
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(NotificationError::NotFound)?.into_model()
    }

    async fn analytics_buckets(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        group_by: AnalyticsGroupBy,
    ) -> Result<Vec<AnalyticsBucket>> {
        // date_trunc 的精度来自封闭枚举，只可能是 day/week/month
        let field = group_by.date_trunc_field();

        let type_sql = format!(
            r#"
            SELECT date_trunc('{field}', created_at) AS bucket,
                   notification_type::text AS key,
                   COUNT(*) AS count
            FROM notifications
            WHERE created_at >= $1 AND created_at <= $2
            GROUP BY bucket, key
            ORDER BY bucket
            "#
        );

        let status_sql = format!(
            r#"
            SELECT date_trunc('{field}', created_at) AS bucket,
                   status::text AS key,
                   COUNT(*) AS count
            FROM notifications
            WHERE created_at >= $1 AND created_at <= $2
            GROUP BY bucket, key
            ORDER BY bucket
            "#
        );

        let type_rows = sqlx::query_as::<_, BucketCountRow>(&type_sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        let status_rows = sqlx::query_as::<_, BucketCountRow>(&status_sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        // BTreeMap 保证桶按时间升序输出
        let mut buckets: BTreeMap<DateTime<Utc>, AnalyticsBucket> = BTreeMap::new();

        for row in type_rows {
            let entry = buckets.entry(row.bucket).or_insert_with(|| AnalyticsBucket {
                bucket: row.bucket,
                total: 0,
                by_type: Vec::new(),
                by_status: Vec::new(),
            });
            entry.total += row.count;
            entry.by_type.push(CountByKey {
                key: row.key,
                count: row.count,
            });
        }

        for row in status_rows {
            let entry = buckets.entry(row.bucket).or_insert_with(|| AnalyticsBucket {
                bucket: row.bucket,
                total: 0,
                by_type: Vec::new(),
                by_status: Vec::new(),
            });
            entry.by_status.push(CountByKey {
                key: row.key,
                count: row.count,
            });
        }

        Ok(buckets.into_values().collect())
    }

    async fn delivery_stats(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ChannelDeliveryStats>> {
        let mut stats = Vec::with_capacity(NotificationChannel::ALL.len());

        for channel in NotificationChannel::ALL {
            let (attempted, opened, read): (i64, i64, i64) = sqlx::query_as(
                r#"
                SELECT
                    COUNT(*) FILTER (WHERE $3 = ANY(channels)),
                    COUNT(*) FILTER (WHERE $3 = ANY(channels) AND opened_at IS NOT NULL),
                    COUNT(*) FILTER (WHERE $3 = ANY(channels) AND read_at IS NOT NULL)
                FROM notifications
                WHERE created_at >= $1 AND created_at <= $2
                "#,
            )
            .bind(start)
            .bind(end)
            .bind(channel.as_str())
            .fetch_one(&self.pool)
            .await?;

            stats.push(ChannelDeliveryStats {
                channel,
                attempted,
                opened,
                read,
            });
        }

        Ok(stats)
    }
}
