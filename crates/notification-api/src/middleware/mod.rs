//! HTTP 中间件

mod auth;
mod permission;

pub use auth::auth_middleware;
pub use permission::require_admin;
