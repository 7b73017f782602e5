//! 认证模块

mod jwt;

pub use jwt::{Claims, JwtConfig, JwtManager};
