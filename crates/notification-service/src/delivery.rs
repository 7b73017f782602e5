//! 投递编排
//!
//! 通知记录落库之后，由本模块负责向外部渠道的扇出发送。
//!
//! ## 设计说明
//!
//! - **异步发送**：投递不阻塞创建流程，创建接口在落库后立即返回
//! - **多渠道并行**：各渠道独立发送，互不影响
//! - **部分失败容忍**：单渠道失败只记录日志和指标，不影响通知记录本身
//! - **in_app 跳过**：站内渠道没有外部系统，写库即完成投递

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use jobhub_shared::observability::metrics::record_delivery;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::channels::{DeliveryChannel, DeliveryOutcome, EmailChannel, PushChannel, SmsChannel};
use crate::models::Notification;

/// 单条通知的投递汇总
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    pub notification_id: Uuid,
    pub outcomes: Vec<DeliveryOutcome>,
    pub duration_ms: u64,
}

impl DeliveryReport {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }

    /// 所有目标渠道均成功（无目标渠道时也视为成功）
    pub fn all_succeeded(&self) -> bool {
        self.failure_count() == 0
    }
}

/// 投递编排服务
///
/// 管理已注册的投递渠道，对单条通知执行并行扇出。
pub struct DeliveryService {
    /// 已注册的投递渠道
    channels: Vec<Arc<dyn DeliveryChannel>>,
}

impl DeliveryService {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    /// 使用默认渠道创建（push / email / sms）
    pub fn with_defaults() -> Self {
        let mut service = Self::new();
        service.register_channel(Arc::new(PushChannel::with_defaults()));
        service.register_channel(Arc::new(EmailChannel::with_defaults()));
        service.register_channel(Arc::new(SmsChannel::with_defaults()));
        service
    }

    /// 注册投递渠道
    pub fn register_channel(&mut self, channel: Arc<dyn DeliveryChannel>) {
        info!(
            channel_type = ?channel.channel_type(),
            channel_name = channel.name(),
            "注册投递渠道"
        );
        self.channels.push(channel);
    }

    /// 投递单条通知
    ///
    /// 根据通知配置的渠道列表筛选出需要外部发送的渠道并行发送。
    /// 渠道层面的失败收敛为 `DeliveryOutcome`，不向上传播错误。
    #[instrument(
        skip(self, notification),
        fields(
            notification_id = %notification.id,
            recipient_id = %notification.recipient_id,
            notification_type = %notification.notification_type,
            channels = ?notification.channels
        )
    )]
    pub async fn dispatch(&self, notification: &Notification) -> DeliveryReport {
        let start = Instant::now();

        // in_app 在此处被过滤掉
        let wanted = notification.provider_channels();

        let mut target_channels = Vec::new();
        for channel in &self.channels {
            if !wanted.contains(&channel.channel_type()) {
                continue;
            }
            if !channel.is_available(notification).await {
                debug!(channel = channel.name(), "渠道不可用，跳过");
                continue;
            }
            target_channels.push(channel.clone());
        }

        if target_channels.is_empty() {
            debug!("没有需要外部投递的渠道");
            return DeliveryReport {
                notification_id: notification.id,
                outcomes: vec![],
                duration_ms: start.elapsed().as_millis() as u64,
            };
        }

        let send_futures: Vec<_> = target_channels
            .iter()
            .map(|channel| {
                let channel = channel.clone();
                async move {
                    let result = channel.send(notification).await;
                    (channel.channel_type(), result)
                }
            })
            .collect();

        let results = join_all(send_futures).await;

        let outcomes: Vec<DeliveryOutcome> = results
            .into_iter()
            .map(|(channel_type, result)| match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(channel = ?channel_type, error = %e, "渠道发送异常");
                    DeliveryOutcome::failed(channel_type, e.to_string(), 0)
                }
            })
            .collect();

        for outcome in &outcomes {
            record_delivery(outcome.channel.as_str(), outcome.success);
        }

        let report = DeliveryReport {
            notification_id: notification.id,
            outcomes,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        if report.all_succeeded() {
            info!(
                success_count = report.success_count(),
                duration_ms = report.duration_ms,
                "通知投递完成"
            );
        } else {
            warn!(
                success_count = report.success_count(),
                failure_count = report.failure_count(),
                duration_ms = report.duration_ms,
                "通知投递部分失败"
            );
        }

        report
    }

    /// 异步投递（fire-and-forget）
    ///
    /// 在后台任务中投递，不阻塞调用者。创建接口走此路径。
    pub fn spawn_dispatch(self: &Arc<Self>, notification: Notification) {
        let service = self.clone();
        tokio::spawn(async move {
            service.dispatch(&notification).await;
        });
    }

    /// 批量异步投递
    pub fn spawn_dispatch_batch(self: &Arc<Self>, notifications: Vec<Notification>) {
        let service = self.clone();
        tokio::spawn(async move {
            let futures: Vec<_> = notifications
                .iter()
                .map(|n| service.dispatch(n))
                .collect();
            join_all(futures).await;
        });
    }
}

impl Default for DeliveryService {
    fn default() -> Self {
        Self::with_defaults()
    }
}
