//! Permission catalog API
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/permissions | GET | Roles.List |
//! | /api/permissions/catalog | GET | Roles.List |
//!
//! The catalog is fixed at seed time; there are no write endpoints.

use axum::extract::State;
use axum::routing::get;
use axum::{Router, middleware};
use shared::models::{Permission, PermissionGroup, group_by_module};

use crate::api::{ApiResponse, AppResult};
use crate::auth::permissions::ROLES_LIST;
use crate::auth::require_permission;
use crate::core::ServerState;
use crate::db::repository::permission;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/permissions", get(list))
        .route("/api/permissions/catalog", get(catalog))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[ROLES_LIST]),
        ))
}

/// Flat list in catalog order
async fn list(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<Permission>>> {
    Ok(ApiResponse::success(permission::find_all(&state.pool).await?))
}

/// Grouped by module for the role editor
async fn catalog(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<PermissionGroup>>> {
    let all = permission::find_all(&state.pool).await?;
    Ok(ApiResponse::success(group_by_module(all)))
}
