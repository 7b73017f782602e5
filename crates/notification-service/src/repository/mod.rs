//! 仓储层
//!
//! 服务层依赖 trait 抽象，具体的 PostgreSQL 实现可在测试中替换为 mock。

mod notification_repo;
mod traits;

pub use notification_repo::NotificationRepository;
pub use traits::NotificationRepositoryTrait;

#[cfg(test)]
pub use traits::MockNotificationRepositoryTrait;
