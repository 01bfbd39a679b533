//! 认证中间件
//!
//! 为 JWT 认证和授权提供 Axum 中间件

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppError;
use crate::auth::gate::{self, Decision};
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展 (`req.extensions_mut().insert(user)`)。
///
/// 本中间件只校验令牌本身，不访问数据库；令牌无效时请求在此短路，
/// 授权闸门不会被执行。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径
/// - `/api/auth/login` (登录接口)
/// - 注册、邮箱确认、找回 / 重置密码
/// - `/api/health` (健康检查)
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 Unauthorized |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 / 无效 subject | 401 InvalidToken |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过认证 (让它们正常返回 404)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    // 公共 API 路由跳过认证
    if is_public_api_route(path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => match JwtService::extract_from_header(header) {
            Some(token) => token,
            None => {
                security_log!(warn, "auth_malformed_header", uri = %req.uri());
                return Err(AppError::invalid_token());
            }
        },
        None => {
            security_log!(warn, "auth_missing", uri = %req.uri());
            return Err(AppError::unauthorized());
        }
    };

    // 验证令牌
    let claims = match state.jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!(warn, "auth_failed", error = %e, uri = %req.uri());
            return Err(match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token(),
            });
        }
    };

    let user = match CurrentUser::try_from(claims) {
        Ok(user) => user,
        Err(e) => {
            security_log!(warn, "auth_bad_subject", error = %e, uri = %req.uri());
            return Err(AppError::invalid_token());
        }
    };

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// 无需令牌的接口
const PUBLIC_API_ROUTES: &[&str] = &[
    "/api/health",
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/confirm-email",
    "/api/auth/resend-email-confirmation",
    "/api/auth/forgot-password",
    "/api/auth/reset-password",
];

fn is_public_api_route(path: &str) -> bool {
    PUBLIC_API_ROUTES.contains(&path)
}

type GateFuture = Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>;

/// 权限检查中间件 - 要求任一权限 (OR 语义)
///
/// 每次请求都从数据库重新读取用户、角色并解析权限，
/// 令牌中的 `role` / `permission` 声明不参与决策。
/// 放行时把 [`crate::auth::AccessContext`] 注入请求扩展，供处理器读取实时角色。
///
/// # 参数
///
/// - `required`: 所需权限列表，如 `&["Users.Edit", "Users.Add"]`，满足任意一项即可
///
/// # 用法
///
/// ```ignore
/// use axum::middleware;
/// Router::new()
///     .route("/api/users", get(handler::list))
///     .layer(middleware::from_fn_with_state(
///         state.clone(),
///         require_permission(&["Users.List"]),
///     ));
/// ```
///
/// # 错误
///
/// | 情况 | HTTP 状态码 |
/// |------|------------|
/// | 用户不存在 / 已停用 | 401 |
/// | 无角色 / 无匹配权限 | 403 (通用提示，不暴露权限名) |
/// | 数据库错误 | 500 |
pub fn require_permission(
    required: &'static [&'static str],
) -> impl Fn(State<ServerState>, Request, Next) -> GateFuture + Clone {
    move |State(state): State<ServerState>, mut req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .cloned()
                .ok_or_else(AppError::unauthorized)?;

            let decision = gate::authorize(
                state.identity.as_ref(),
                state.catalog.as_ref(),
                user.id,
                required,
            )
            .await
            .map_err(|e| {
                tracing::error!(user_id = user.id, error = %e, "Authorization lookup failed");
                AppError::from(e)
            })?;

            match decision {
                Decision::Allow(access) => {
                    req.extensions_mut().insert(access);
                    Ok(next.run(req).await)
                }
                Decision::Deny(reason) => {
                    security_log!(
                        warn,
                        "permission_denied",
                        user_id = user.id,
                        email = %user.email,
                        reason = reason.as_str(),
                        required = ?required,
                        uri = %req.uri()
                    );
                    Err(reason.to_error())
                }
            }
        }) as GateFuture
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_routes() {
        assert!(is_public_api_route("/api/auth/login"));
        assert!(is_public_api_route("/api/health"));
        assert!(is_public_api_route("/api/auth/register"));
        assert!(is_public_api_route("/api/auth/reset-password"));
        assert!(!is_public_api_route("/api/auth/me"));
        assert!(!is_public_api_route("/api/auth/login/extra"));
    }
}
