//! Login, session and self-service account DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{self, Normalize};

/// Login request
///
/// Only presence is checked here; credential rules are not revealed at login.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "is required."))]
    pub email: String,
    #[validate(length(min = 1, message = "is required."))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Normalize for LoginRequest {
    fn normalize(&mut self) {
        validation::trim(&mut self.email);
        self.email = self.email.to_lowercase();
    }
}

/// Self-service registration
///
/// Registered accounts get the `User` role and start with an unconfirmed email.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "validation::validate_words"))]
    pub first_name: String,
    #[validate(custom(function = "validation::validate_words"))]
    pub last_name: Option<String>,
    #[validate(custom(function = "validation::validate_email"))]
    pub email: String,
    #[validate(custom(function = "validation::validate_phone"))]
    pub phone: Option<String>,
    #[validate(custom(function = "validation::validate_password"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Normalize for RegisterRequest {
    fn normalize(&mut self) {
        validation::trim(&mut self.first_name);
        validation::trim_opt(&mut self.last_name);
        validation::trim(&mut self.email);
        self.email = self.email.to_lowercase();
        validation::trim_opt(&mut self.phone);
    }
}

/// Query of an email confirmation link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmEmailQuery {
    pub user_id: i64,
    pub token: String,
}

impl Normalize for ConfirmEmailQuery {
    fn normalize(&mut self) {
        validation::trim(&mut self.token);
    }
}

/// Body of resend-confirmation and forgot-password requests
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(custom(function = "validation::validate_email"))]
    pub email: String,
}

impl Normalize for EmailRequest {
    fn normalize(&mut self) {
        validation::trim(&mut self.email);
        self.email = self.email.to_lowercase();
    }
}

/// Password reset with the token from a reset link
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(custom(function = "validation::validate_email"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required."))]
    pub token: String,
    #[validate(custom(function = "validation::validate_password"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

impl std::fmt::Debug for ResetPasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetPasswordRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Normalize for ResetPasswordRequest {
    fn normalize(&mut self) {
        validation::trim(&mut self.email);
        self.email = self.email.to_lowercase();
        validation::trim(&mut self.token);
    }
}

/// Identity returned by login and `/api/auth/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub display_name: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Token expiry (Unix millis)
    pub expires_at: i64,
    pub user: UserInfo,
}
