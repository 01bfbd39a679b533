//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/health | GET | 服务与数据库状态 | 无 |

use axum::{Router, extract::State, routing::get};
use serde::Serialize;

use super::{ApiResponse, AppResult};
use crate::core::ServerState;
use crate::utils::AppError;

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
}

/// 数据库不可用时返回 500
async fn health(State(state): State<ServerState>) -> AppResult<ApiResponse<HealthResponse>> {
    sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .map_err(|e| AppError::database(format!("Health check failed: {e}")))?;

    Ok(ApiResponse::success(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
    }))
}
