//! API 层错误类型定义
//!
//! 将服务层错误映射为 HTTP 响应，系统级错误在生产环境只返回通用提示。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use jobhub_notification::error::{FieldError, NotificationError};

/// API 错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("禁止访问: {0}")]
    Forbidden(String),

    // 参数错误
    #[error("参数验证失败")]
    Validation(Vec<FieldError>),
    #[error("参数错误: {0}")]
    BadRequest(String),

    // 资源不存在
    #[error("通知不存在")]
    NotFound,

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::NotFound => Self::NotFound,
            NotificationError::Validation(fields) => Self::Validation(fields),
            NotificationError::Database(e) => Self::Database(e),
            NotificationError::Channel { channel, message } => {
                Self::Internal(format!("渠道 {} 投递失败: {}", channel, message))
            }
            NotificationError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let fields = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "参数不合法".to_string());
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        Self::Validation(fields)
    }
}

fn is_production() -> bool {
    std::env::var("JOBHUB_ENV").unwrap_or_default() == "production"
}

impl ApiError {
    /// 生成返回给调用方的消息和附加数据
    ///
    /// 系统级错误在生产环境只返回通用提示，详细信息仅记录日志，
    /// 防止信息泄露；非生产环境带上底层原因便于排查。
    fn client_payload(&self, production: bool) -> (String, Option<serde_json::Value>) {
        match self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                if production {
                    ("服务内部错误，请稍后重试".to_string(), None)
                } else {
                    (format!("数据库错误: {}", e), None)
                }
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "内部错误");
                if production {
                    ("服务内部错误，请稍后重试".to_string(), None)
                } else {
                    (format!("内部错误: {}", msg), None)
                }
            }
            Self::Validation(fields) => (
                "参数验证失败".to_string(),
                Some(serde_json::to_value(fields).unwrap_or_default()),
            ),
            other => (other.to_string(), None),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let (message, data) = self.client_payload(is_production());

        let body = json!({
            "success": false,
            "code": code,
            "message": message,
            "data": data,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_not_found_from_service_error() {
        let err: ApiError = NotificationError::NotFound.into();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_internal_message_redacted_in_production() {
        let err = ApiError::Internal("连接池耗尽".to_string());
        let (message, data) = err.client_payload(true);
        assert_eq!(message, "服务内部错误，请稍后重试");
        assert!(data.is_none());
    }

    #[test]
    fn test_internal_cause_echoed_outside_production() {
        let err = ApiError::Internal("连接池耗尽".to_string());
        let (message, _) = err.client_payload(false);
        assert!(message.contains("连接池耗尽"));

        let err = ApiError::Internal("x".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
