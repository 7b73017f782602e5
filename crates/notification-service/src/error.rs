//! 通知服务错误类型定义

use serde::Serialize;
use thiserror::Error;

/// 单个字段的校验错误
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 通知服务错误类型
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    /// 统一的"未找到"：不区分不存在和不属于当前用户，避免泄露存在性
    #[error("通知不存在")]
    NotFound,

    #[error("参数校验失败: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("投递渠道错误: {channel} - {message}")]
    Channel { channel: String, message: String },

    #[error("内部错误: {0}")]
    Internal(String),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, NotificationError>;

impl NotificationError {
    /// 便捷构造：单字段校验错误
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Channel { .. } => "CHANNEL_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<jobhub_shared::error::SharedError> for NotificationError {
    fn from(err: jobhub_shared::error::SharedError) -> Self {
        match err {
            jobhub_shared::error::SharedError::Database(e) => Self::Database(e),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_fields() {
        let err = NotificationError::Validation(vec![
            FieldError::new("title", "不能为空"),
            FieldError::new("message", "超过长度上限"),
        ]);
        let text = err.to_string();
        assert!(text.contains("title"));
        assert!(text.contains("message"));
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_not_found_is_uniform() {
        // 未找到的文案不携带任何 id 或归属信息
        assert_eq!(NotificationError::NotFound.to_string(), "通知不存在");
    }
}
