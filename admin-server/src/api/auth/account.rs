//! Self-service account handlers
//!
//! Registration, email confirmation and password reset. All routes are
//! public. Link tokens come from [`AccountTokenService`]; delivering the link
//! is left to the mail transport, which only receives it on the `mail` log
//! target here.
//!
//! [`AccountTokenService`]: crate::auth::AccountTokenService

use axum::extract::State;
use shared::models::{
    AuditType, ConfirmEmailQuery, EmailRequest, RegisterRequest, ResetPasswordRequest, User,
    UserCreate,
};

use crate::api::{ApiResponse, AppResult};
use crate::auth::permissions::USER;
use crate::auth::{AccountPurpose, hash_password};
use crate::cache;
use crate::core::ServerState;
use crate::db::repository::{role, user};
use crate::security_log;
use crate::utils::validation::{Filter, ValidJson};
use crate::utils::{AppError, ErrorCode};

const REGISTERED: &str = "Registration successful. Please check your email to confirm.";
const CONFIRMATION_SENT: &str = "If the email is registered, a confirmation link has been sent.";
const RESET_SENT: &str =
    "If an account with that email exists, you will receive a password reset email.";

/// POST /api/auth/register
///
/// Creates an active account with the `User` role and an unconfirmed email.
pub async fn register(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> AppResult<ApiResponse<()>> {
    let default_role = role::find_by_name(&state.pool, USER)
        .await?
        .filter(|r| r.is_active)
        .ok_or_else(|| AppError::internal("Registration role is missing or inactive"))?;

    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    let data = UserCreate {
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        phone: req.phone,
        password: req.password,
        role_id: default_role.id,
        is_active: true,
    };
    let created = user::register(&state.pool, &data, &password_hash).await?;
    state.list_cache.invalidate(cache::USERS);

    state
        .audit
        .log(&created.display_name(), AuditType::Authentication, "Registered")
        .await?;
    security_log!(info, "account_registered", user_id = created.id, email = %created.email);

    send_link(&state, &created, AccountPurpose::ConfirmEmail)?;
    Ok(ApiResponse::message(REGISTERED))
}

/// GET /api/auth/confirm-email?user_id=&token=
pub async fn confirm_email(
    State(state): State<ServerState>,
    Filter(query): Filter<ConfirmEmailQuery>,
) -> AppResult<ApiResponse<()>> {
    let account = user::find_by_id(&state.pool, query.user_id)
        .await?
        .ok_or_else(link_invalid)?;
    check_link(&state, &query.token, &account, AccountPurpose::ConfirmEmail)?;

    user::confirm_email(&state.pool, account.id).await?;
    state.list_cache.invalidate(cache::USERS);
    state
        .audit
        .log(&account.display_name(), AuditType::Authentication, "Confirmed email")
        .await?;
    Ok(ApiResponse::message("Email confirmed successfully."))
}

/// POST /api/auth/resend-email-confirmation
///
/// Same answer whether or not the email is registered or already confirmed.
pub async fn resend_confirmation(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<EmailRequest>,
) -> AppResult<ApiResponse<()>> {
    if let Some(account) = user::find_by_email(&state.pool, &req.email).await?
        && !account.is_email_confirmed
    {
        send_link(&state, &account, AccountPurpose::ConfirmEmail)?;
    }
    Ok(ApiResponse::message(CONFIRMATION_SENT))
}

/// POST /api/auth/forgot-password
///
/// Same answer whether or not the email is registered.
pub async fn forgot_password(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<EmailRequest>,
) -> AppResult<ApiResponse<()>> {
    match user::find_by_email(&state.pool, &req.email).await? {
        Some(account) => send_link(&state, &account, AccountPurpose::ResetPassword)?,
        None => security_log!(warn, "password_reset_unknown_email", email = %req.email),
    }
    Ok(ApiResponse::message(RESET_SENT))
}

/// POST /api/auth/reset-password
///
/// Unknown email and bad token share one error.
pub async fn reset_password(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<ResetPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    let account = user::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or_else(link_invalid)?;
    check_link(&state, &req.token, &account, AccountPurpose::ResetPassword)?;

    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    user::update_password(&state.pool, account.id, &password_hash, account.id).await?;

    state
        .audit
        .log(&account.display_name(), AuditType::Authentication, "Reset password")
        .await?;
    security_log!(info, "password_reset", user_id = account.id);
    Ok(ApiResponse::message("Password has been reset successfully."))
}

fn link_invalid() -> AppError {
    AppError::new(ErrorCode::AccountLinkInvalid)
}

fn check_link(
    state: &ServerState,
    token: &str,
    account: &User,
    purpose: AccountPurpose,
) -> AppResult<()> {
    state
        .account_tokens
        .verify(token, account, purpose)
        .map_err(|e| {
            security_log!(
                warn,
                "account_link_rejected",
                user_id = account.id,
                purpose = purpose.as_str(),
                error = %e
            );
            link_invalid()
        })
}

/// Issue a link token and hand the link to the mail transport
fn send_link(state: &ServerState, account: &User, purpose: AccountPurpose) -> AppResult<()> {
    let token = state
        .account_tokens
        .issue(account, purpose)
        .map_err(|e| AppError::internal(format!("Failed to generate link token: {e}")))?;

    let base = &state.config.app_base_url;
    let link = match purpose {
        AccountPurpose::ConfirmEmail => {
            format!("{base}/confirm-email?user_id={}&token={token}", account.id)
        }
        AccountPurpose::ResetPassword => {
            format!("{base}/account/reset-password?email={}&token={token}", account.email)
        }
    };
    tracing::debug!(
        target: "mail",
        user_id = account.id,
        purpose = purpose.as_str(),
        %link,
        "Account link ready for delivery"
    );
    Ok(())
}
