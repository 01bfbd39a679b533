//! Authentication Routes

mod account;
mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

/// Build authentication router
/// - /api/auth/login and the self-service account routes: public
/// - /api/auth/me, /api/auth/logout: authenticated only (global `require_auth`), no permission gate
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/logout", post(handler::logout))
        .route("/api/auth/register", post(account::register))
        .route("/api/auth/confirm-email", get(account::confirm_email))
        .route("/api/auth/resend-email-confirmation", post(account::resend_confirmation))
        .route("/api/auth/forgot-password", post(account::forgot_password))
        .route("/api/auth/reset-password", post(account::reset_password))
}
