//! 通知服务实体模型

mod enums;
mod notification;

pub use enums::{
    AnalyticsGroupBy, NotificationCategory, NotificationChannel, NotificationPriority,
    NotificationStatus, NotificationType,
};
pub use notification::{DeviceInfo, MESSAGE_MAX_CHARS, Notification, TITLE_MAX_CHARS};
