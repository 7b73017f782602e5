//! 服务层
//!
//! 业务逻辑入口，依赖仓储抽象，负责校验、缓存和投递编排的衔接。

pub mod analytics;
pub mod bulk;
pub mod dto;
pub mod engagement;
pub mod store;

pub use analytics::AnalyticsService;
pub use bulk::BulkIngestService;
pub use engagement::EngagementService;
pub use store::NotificationStore;
