//! 统计 API 处理器（管理端）

use axum::{
    Json,
    extract::{Query, State},
};

use jobhub_notification::service::dto::{AnalyticsBucket, ChannelDeliveryStats};

use crate::dto::{AnalyticsQuery, ApiResponse, DeliveryStatsQuery};
use crate::error::ApiError;
use crate::state::AppState;

/// 时间桶统计
///
/// GET /api/notifications/analytics
pub async fn analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<ApiResponse<Vec<AnalyticsBucket>>>, ApiError> {
    let buckets = state
        .analytics
        .buckets(query.start_date, query.end_date, query.group_by)
        .await?;
    Ok(Json(ApiResponse::success(buckets)))
}

/// 按渠道投递统计
///
/// GET /api/notifications/delivery-stats
pub async fn delivery_stats(
    State(state): State<AppState>,
    Query(query): Query<DeliveryStatsQuery>,
) -> Result<Json<ApiResponse<Vec<ChannelDeliveryStats>>>, ApiError> {
    let stats = state
        .analytics
        .delivery_stats(query.start_date, query.end_date)
        .await?;
    Ok(Json(ApiResponse::success(stats)))
}
