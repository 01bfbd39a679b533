//! User API Handlers

use axum::extract::{Path, State};
use shared::models::{
    AuditType, ChangePassword, CountResponse, EmailAvailability, EmailAvailabilityQuery, PageQuery,
    Paged, User, UserCreate, UserFilter, UserListItem, UserUpdate,
};

use crate::api::{ApiResponse, AppResult};
use crate::auth::permissions::SUPER_ADMIN;
use crate::auth::{AccessContext, CurrentUser, hash_password, verify_password};
use crate::cache::{self, ListCache};
use crate::core::ServerState;
use crate::db::repository::{role, user};
use crate::security_log;
use crate::utils::query::{ListQuery, USER_SORT};
use crate::utils::validation::{Filter, ValidJson};
use crate::utils::{AppError, ErrorCode};

/// GET /api/users - paged, filtered user list with role names
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Filter(page): Filter<PageQuery>,
    Filter(filter): Filter<UserFilter>,
) -> AppResult<ApiResponse<Paged<UserListItem>>> {
    let query = ListQuery::parse(&page, &USER_SORT)?;
    let key = ListCache::key(cache::USERS, &query, &filter);
    let users = state
        .list_cache
        .get_or_load(key, || user::find_page(&state.pool, &filter, &query))
        .await?;

    state
        .audit
        .log(&current.display_name, AuditType::View, "Viewed users list")
        .await?;
    Ok(ApiResponse::success(users))
}

/// GET /api/users/count
pub async fn count(State(state): State<ServerState>) -> AppResult<ApiResponse<CountResponse>> {
    let count = user::count(&state.pool).await?;
    Ok(ApiResponse::success(CountResponse { count }))
}

/// GET /api/users/is-email-available?email= - backs the "email taken" hint on user forms
pub async fn is_email_available(
    State(state): State<ServerState>,
    Filter(query): Filter<EmailAvailabilityQuery>,
) -> AppResult<ApiResponse<EmailAvailability>> {
    if query.email.is_empty() {
        return Err(AppError::validation("email: is required."));
    }
    let taken = user::find_by_email(&state.pool, &query.email).await?;
    Ok(ApiResponse::success(EmailAvailability {
        available: taken.is_none(),
    }))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<User>> {
    let found = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(found))
}

/// POST /api/users
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    access: AccessContext,
    ValidJson(payload): ValidJson<UserCreate>,
) -> AppResult<ApiResponse<User>> {
    ensure_can_assign(&state, &access, payload.role_id).await?;

    let password_hash = hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    let created = user::create(&state.pool, &payload, &password_hash, current.id).await?;
    state.list_cache.invalidate(cache::USERS);

    state
        .audit
        .log(
            &current.display_name,
            AuditType::Create,
            format!("Created user {}", created.email),
        )
        .await?;
    tracing::info!(user_id = created.id, email = %created.email, "User created");
    Ok(ApiResponse::success(created))
}

/// PUT /api/users/{id}
///
/// A non-blank `reset_password` replaces the password without the old one.
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    access: AccessContext,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<UserUpdate>,
) -> AppResult<ApiResponse<User>> {
    if id == current.id && !payload.is_active {
        return Err(AppError::new(ErrorCode::UserCannotModifySelf));
    }
    ensure_can_assign(&state, &access, payload.role_id).await?;

    let reset_hash = payload
        .reset_password
        .as_deref()
        .map(hash_password)
        .transpose()
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    let updated = user::update(&state.pool, id, &payload, current.id).await?;
    if let Some(password_hash) = reset_hash {
        user::update_password(&state.pool, id, &password_hash, current.id).await?;
        state
            .audit
            .log(
                &current.display_name,
                AuditType::Update,
                format!("Reset password of user {}", updated.email),
            )
            .await?;
        security_log!(info, "password_reset_by_admin", user_id = id, actor_id = current.id);
    }
    state.list_cache.invalidate(cache::USERS);

    state
        .audit
        .log(
            &current.display_name,
            AuditType::Update,
            format!("Updated user {}", updated.email),
        )
        .await?;
    Ok(ApiResponse::success(updated))
}

/// PATCH /api/users/{id}/toggle
pub async fn toggle_status(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<User>> {
    if id == current.id {
        return Err(AppError::new(ErrorCode::UserCannotModifySelf));
    }
    let existing = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let toggled = user::set_active(&state.pool, id, !existing.is_active, current.id).await?;
    state.list_cache.invalidate(cache::USERS);

    let status = if toggled.is_active { "Activated" } else { "Deactivated" };
    state
        .audit
        .log(
            &current.display_name,
            AuditType::Update,
            format!("{status} user {}", toggled.email),
        )
        .await?;
    Ok(ApiResponse::success(toggled))
}

/// POST /api/users/{id}/change-password
///
/// The current password must be supplied even by administrators.
pub async fn change_password(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<ChangePassword>,
) -> AppResult<ApiResponse<()>> {
    let target = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let matches = verify_password(&payload.old_password, &target.password_hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !matches {
        return Err(AppError::new(ErrorCode::UserPasswordIncorrect));
    }

    let password_hash = hash_password(&payload.new_password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    user::update_password(&state.pool, id, &password_hash, current.id).await?;

    state
        .audit
        .log(
            &current.display_name,
            AuditType::Update,
            format!("Changed password of user {}", target.email),
        )
        .await?;
    Ok(ApiResponse::message("Password changed"))
}

/// DELETE /api/users/{id}
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    if id == current.id {
        return Err(AppError::new(ErrorCode::UserCannotModifySelf));
    }
    let deleted = user::delete(&state.pool, id).await?;
    state.list_cache.invalidate(cache::USERS);

    state
        .audit
        .log(
            &current.display_name,
            AuditType::Delete,
            format!("Deleted user {}", deleted.email),
        )
        .await?;
    tracing::info!(user_id = id, "User deleted");
    Ok(ApiResponse::message("User deleted"))
}

/// GET /api/users/export - records the export; the client renders the file
pub async fn export(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<ApiResponse<()>> {
    state
        .audit
        .log(&current.display_name, AuditType::Export, "Exported users list")
        .await?;
    Ok(ApiResponse::message("User export recorded"))
}

/// Only a caller whose live roles include SuperAdmin may hand it out
async fn ensure_can_assign(
    state: &ServerState,
    access: &AccessContext,
    role_id: i64,
) -> AppResult<()> {
    let target = role::find_by_id(&state.pool, role_id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::RoleNotFound, format!("Role {role_id} not found"))
    })?;
    if target.name == SUPER_ADMIN && !access.has_role(SUPER_ADMIN) {
        return Err(AppError::new(ErrorCode::SuperAdminRequired));
    }
    Ok(())
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found"))
}
