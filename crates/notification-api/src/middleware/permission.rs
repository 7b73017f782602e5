//! 角色检查中间件
//!
//! 管理端路由要求 admin 角色

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::auth::Claims;

/// admin 角色检查
///
/// Claims 由 auth_middleware 注入；缺少 admin 角色返回 403。
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    let claims = match request.extensions().get::<Claims>() {
        Some(claims) => claims,
        None => return unauthorized_response("未认证"),
    };

    if !claims.is_admin() {
        return forbidden_response("需要管理员权限");
    }

    next.run(request).await
}

fn unauthorized_response(message: &str) -> Response {
    let body = json!({
        "success": false,
        "code": "UNAUTHORIZED",
        "message": message,
        "data": null
    });
    (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
}

fn forbidden_response(message: &str) -> Response {
    let body = json!({
        "success": false,
        "code": "FORBIDDEN",
        "message": message,
        "data": null
    });
    (StatusCode::FORBIDDEN, axum::Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, middleware, routing::get};
    use chrono::Utc;
    use tower::ServiceExt;

    fn claims(roles: Vec<&str>) -> Claims {
        Claims {
            sub: "user-1".to_string(),
            username: "alice".to_string(),
            roles: roles.into_iter().map(String::from).collect(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
            iss: "jobhub-test".to_string(),
        }
    }

    fn app() -> Router {
        Router::new()
            .route("/admin-only", get(|| async { "ok" }))
            .layer(middleware::from_fn(require_admin))
    }

    async fn send(app: Router, claims: Option<Claims>) -> StatusCode {
        let mut request = Request::builder()
            .uri("/admin-only")
            .body(Body::empty())
            .unwrap();
        if let Some(claims) = claims {
            request.extensions_mut().insert(claims);
        }
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_admin_role_passes() {
        let status = send(app(), Some(claims(vec!["admin"]))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        let status = send(app(), Some(claims(vec!["jobseeker"]))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_claims_unauthorized() {
        let status = send(app(), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
