//! JobHub 通知服务核心库
//!
//! 通知生命周期与投递子系统的业务实现，被 API 层引用。
//!
//! ## 模块划分
//!
//! - `models`: 通知实体和枚举定义
//! - `template`: 消息模板目录与渲染
//! - `repository`: PostgreSQL 持久化
//! - `service`: 业务服务（存储、批量摄入、互动、统计）
//! - `channels`: 外部投递渠道实现
//! - `delivery`: 投递编排（并行扇出）

pub mod channels;
pub mod delivery;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod template;

pub use delivery::{DeliveryReport, DeliveryService};
pub use error::{NotificationError, Result};
pub use repository::{NotificationRepository, NotificationRepositoryTrait};
pub use service::{AnalyticsService, BulkIngestService, EngagementService, NotificationStore};
pub use template::{MessageTemplate, TemplateCatalog};
