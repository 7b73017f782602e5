//! API 处理器

pub mod admin;
pub mod analytics;
pub mod notification;
