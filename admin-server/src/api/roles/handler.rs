//! Role API Handlers

use axum::extract::{Path, State};
use shared::models::{
    AuditType, CountResponse, PageQuery, Paged, Role, RoleDetail, RoleFilter, RoleOption,
    RolePayload,
};

use crate::api::{ApiResponse, AppResult};
use crate::auth::CurrentUser;
use crate::cache::{self, ListCache};
use crate::core::ServerState;
use crate::db::repository::role;
use crate::utils::query::{ListQuery, ROLE_SORT};
use crate::utils::validation::{Filter, ValidJson};
use crate::utils::{AppError, ErrorCode};

/// GET /api/roles - paged, filtered role list
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Filter(page): Filter<PageQuery>,
    Filter(filter): Filter<RoleFilter>,
) -> AppResult<ApiResponse<Paged<Role>>> {
    let query = ListQuery::parse(&page, &ROLE_SORT)?;
    let key = ListCache::key(cache::ROLES, &query, &filter);
    let roles = state
        .list_cache
        .get_or_load(key, || role::find_page(&state.pool, &filter, &query))
        .await?;

    state
        .audit
        .log(&current.display_name, AuditType::View, "Viewed roles list")
        .await?;
    Ok(ApiResponse::success(roles))
}

/// GET /api/roles/count
pub async fn count(State(state): State<ServerState>) -> AppResult<ApiResponse<CountResponse>> {
    let count = role::count(&state.pool).await?;
    Ok(ApiResponse::success(CountResponse { count }))
}

/// GET /api/roles/simple - active roles for assignment dropdowns
pub async fn options(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<RoleOption>>> {
    Ok(ApiResponse::success(role::find_options(&state.pool).await?))
}

/// GET /api/roles/{id} - role with its permissions
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<RoleDetail>> {
    detail(&state, id).await
}

/// POST /api/roles
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidJson(payload): ValidJson<RolePayload>,
) -> AppResult<ApiResponse<RoleDetail>> {
    let created = role::create(&state.pool, &payload, current.id).await?;
    invalidate(&state);

    state
        .audit
        .log(
            &current.display_name,
            AuditType::Create,
            format!("Created role {}", created.name),
        )
        .await?;
    tracing::info!(role_id = created.id, name = %created.name, "Role created");

    detail(&state, created.id).await
}

/// PUT /api/roles/{id} - replaces name, description, status and permissions
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<RolePayload>,
) -> AppResult<ApiResponse<RoleDetail>> {
    let updated = role::update(&state.pool, id, &payload, current.id).await?;
    invalidate(&state);

    state
        .audit
        .log(
            &current.display_name,
            AuditType::Update,
            format!("Updated role {}", updated.name),
        )
        .await?;
    tracing::info!(role_id = id, "Role updated");

    detail(&state, id).await
}

/// PATCH /api/roles/{id}/toggle-status
pub async fn toggle_status(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Role>> {
    let toggled = role::toggle_status(&state.pool, id, current.id).await?;
    invalidate(&state);

    let status = if toggled.is_active { "Activated" } else { "Deactivated" };
    state
        .audit
        .log(
            &current.display_name,
            AuditType::Update,
            format!("{status} role {}", toggled.name),
        )
        .await?;
    Ok(ApiResponse::success(toggled))
}

/// DELETE /api/roles/{id}
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    let deleted = role::delete(&state.pool, id).await?;
    invalidate(&state);

    state
        .audit
        .log(
            &current.display_name,
            AuditType::Delete,
            format!("Deleted role {}", deleted.name),
        )
        .await?;
    tracing::info!(role_id = id, name = %deleted.name, "Role deleted");
    Ok(ApiResponse::message("Role deleted"))
}

/// GET /api/roles/export - records the export; the client renders the file
pub async fn export(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<ApiResponse<()>> {
    state
        .audit
        .log(&current.display_name, AuditType::Export, "Exported roles list")
        .await?;
    Ok(ApiResponse::message("Role export recorded"))
}

async fn detail(state: &ServerState, id: i64) -> AppResult<ApiResponse<RoleDetail>> {
    let detail = role::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(detail))
}

/// User lists show role names, so both namespaces go
fn invalidate(state: &ServerState) {
    state.list_cache.invalidate(cache::ROLES);
    state.list_cache.invalidate(cache::USERS);
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::RoleNotFound, format!("Role {id} not found"))
}
