//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射。管理端方法在 MethodRouter
//! 级别挂 require_admin，与用户侧方法可以共存于同一路径。

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::{handlers, middleware::require_admin, state::AppState};

/// 组装 /api/notifications 下的全部路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // 用户侧
        .route("/", get(handlers::notification::list_notifications))
        .route(
            "/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/mark-all-read",
            patch(handlers::notification::mark_all_as_read),
        )
        .route("/{id}", get(handlers::notification::get_notification))
        .route("/{id}", delete(handlers::notification::delete_notification))
        .route("/{id}/read", patch(handlers::notification::mark_as_read))
        .route(
            "/{id}/archive",
            patch(handlers::notification::archive_notification),
        )
        .route(
            "/{id}/dismiss",
            patch(handlers::notification::dismiss_notification),
        )
        .route(
            "/{id}/track-open",
            post(handlers::notification::track_open),
        )
        .route(
            "/{id}/track-click",
            post(handlers::notification::track_click),
        )
        // 管理端（admin 角色）
        .route(
            "/",
            post(handlers::admin::create_notification)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/bulk",
            post(handlers::admin::bulk_create).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/templates",
            get(handlers::admin::list_templates).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/analytics",
            get(handlers::analytics::analytics).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/delivery-stats",
            get(handlers::analytics::delivery_stats)
                .layer(middleware::from_fn(require_admin)),
        )
}
