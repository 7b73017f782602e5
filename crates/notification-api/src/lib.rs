//! JobHub 通知 API 服务
//!
//! 通知生命周期子系统的 REST 接口层。
//!
//! ## 核心功能
//!
//! - **用户侧**：列表、详情、未读数、状态流转、互动上报
//! - **管理端**：单条/批量创建、模板目录、统计报表
//!
//! ## 模块结构
//!
//! - `auth`: JWT 生成与验证
//! - `middleware`: 认证和角色检查中间件
//! - `dto`: 请求和响应的数据传输对象
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `state`: 应用状态
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator
//! - 序列化：serde (camelCase)

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use auth::{Claims, JwtConfig, JwtManager};
pub use dto::ApiResponse;
pub use error::ApiError;
pub use state::AppState;
