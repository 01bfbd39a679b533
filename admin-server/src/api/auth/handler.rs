//! Authentication Handlers
//!
//! Handles login, current-user lookup and logout

use std::collections::BTreeSet;
use std::time::Duration;

use axum::extract::State;
use shared::models::{AuditType, LoginRequest, LoginResponse, User, UserInfo};

use crate::api::{ApiResponse, AppResult};
use crate::auth::{CurrentUser, resolver, verify_password};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::validation::ValidJson;
use crate::utils::{AppError, ErrorCode};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Login handler
///
/// Authenticates credentials and returns a JWT plus the resolved roles and
/// permissions. Unknown email and wrong password share one error message.
pub async fn login(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let found = user::find_by_email(&state.pool, &req.email).await?;

    // Fixed delay before looking at the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let account = match found {
        Some(account) => account,
        None => {
            state
                .audit
                .log(&req.email, AuditType::Authentication, "Failed login: unknown email")
                .await?;
            security_log!(warn, "login_failed", email = %req.email, reason = "user_not_found");
            return Err(AppError::invalid_credentials());
        }
    };

    let password_valid = verify_password(&req.password, &account.password_hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !password_valid {
        state
            .audit
            .log(
                &account.display_name(),
                AuditType::Authentication,
                "Failed login: invalid password",
            )
            .await?;
        security_log!(warn, "login_failed", email = %req.email, reason = "invalid_password");
        return Err(AppError::invalid_credentials());
    }

    if !account.is_active {
        security_log!(warn, "login_failed", email = %req.email, reason = "account_disabled");
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let (roles, permissions) = live_access(&state, &account).await?;
    let issued = state
        .jwt_service
        .issue(&account, &roles, &permissions)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    user::touch_last_login(&state.pool, account.id).await?;
    state
        .audit
        .log(&account.display_name(), AuditType::Authentication, "Logged in")
        .await?;
    security_log!(info, "login_success", user_id = account.id, email = %account.email);

    Ok(ApiResponse::success(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: user_info(&account, roles, permissions),
    }))
}

/// Current user with live roles and permissions
pub async fn me(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<ApiResponse<UserInfo>> {
    let account = active_account(&state, current.id).await?;
    let (roles, permissions) = live_access(&state, &account).await?;
    Ok(ApiResponse::success(user_info(&account, roles, permissions)))
}

/// Logout handler
///
/// Tokens are stateless; the client discards its copy and the event is audited.
/// Deleted or disabled accounts are refused like on `me`.
pub async fn logout(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<ApiResponse<()>> {
    let account = active_account(&state, current.id).await?;
    state
        .audit
        .log(&account.display_name(), AuditType::Authentication, "Logged out")
        .await?;
    tracing::info!(user_id = account.id, "User logged out");
    Ok(ApiResponse::message("Logged out"))
}

/// The token's account as stored now: missing is unauthorized, inactive is disabled
async fn active_account(state: &ServerState, id: i64) -> AppResult<User> {
    let account = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(AppError::unauthorized)?;
    if !account.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    Ok(account)
}

/// Roles from the identity store and their resolved permissions
async fn live_access(state: &ServerState, account: &User) -> AppResult<(Vec<String>, Vec<String>)> {
    let roles: BTreeSet<String> = state
        .identity
        .get_roles_for_user(account)
        .await?
        .into_iter()
        .collect();
    let permissions = resolver::resolve(state.catalog.as_ref(), &roles).await?;
    Ok((roles.into_iter().collect(), permissions.into_iter().collect()))
}

fn user_info(account: &User, roles: Vec<String>, permissions: Vec<String>) -> UserInfo {
    UserInfo {
        id: account.id,
        email: account.email.clone(),
        first_name: account.first_name.clone(),
        last_name: account.last_name.clone(),
        display_name: account.display_name(),
        roles,
        permissions,
    }
}
