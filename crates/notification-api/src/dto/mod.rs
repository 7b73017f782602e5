//! 请求/响应 DTO

mod request;
mod response;

pub use request::{
    AnalyticsQuery, BulkCreateRequest, CreateNotificationRequest, DeliveryStatsQuery,
    DeviceInfoRequest, ListNotificationsQuery, MarkAllReadRequest, TrackClickRequest,
    TrackOpenRequest,
};
pub use response::{
    ApiResponse, BulkCreateResponse, MarkAllReadResponse, NotificationDetailDto, NotificationDto,
    NotificationListResponse, UnreadCountResponse,
};
