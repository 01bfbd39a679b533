//! User Model

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{self, Normalize};

/// User row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role_id: Option<i64>,
    pub is_active: bool,
    pub is_email_confirmed: bool,
    pub last_login: Option<i64>,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_by: Option<i64>,
    pub updated_at: Option<i64>,
}

impl User {
    /// "First Last", falling back to the email when both are blank
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, self.last_name.as_deref(), &self.email)
    }
}

pub fn display_name(first_name: &str, last_name: Option<&str>, email: &str) -> String {
    let full = format!("{} {}", first_name, last_name.unwrap_or_default());
    let full = full.trim();
    if full.is_empty() {
        email.to_string()
    } else {
        full.to_string()
    }
}

/// User list row (joined with the role name)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserListItem {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub role_id: Option<i64>,
    pub role_name: Option<String>,
    pub is_active: bool,
    pub last_login: Option<i64>,
    pub created_at: i64,
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserCreate {
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
    pub role_id: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Update user payload
///
/// `reset_password` lets an administrator set a new password without the
/// old one; self-service changes go through [`ChangePassword`].
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(custom(function = "validation::validate_words"))]
    pub first_name: String,
    #[validate(custom(function = "validation::validate_words"))]
    pub last_name: Option<String>,
    #[validate(custom(function = "validation::validate_email"))]
    pub email: String,
    #[validate(custom(function = "validation::validate_phone"))]
    pub phone: Option<String>,
    pub role_id: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing)]
    #[validate(custom(function = "validation::validate_password"))]
    pub reset_password: Option<String>,
}

impl std::fmt::Debug for UserUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserUpdate")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("role_id", &self.role_id)
            .field("is_active", &self.is_active)
            .field("reset_password", &self.reset_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Change password payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePassword {
    #[validate(custom(function = "validation::validate_password"))]
    pub old_password: String,
    #[validate(custom(function = "validation::validate_password"))]
    pub new_password: String,
}

fn default_true() -> bool {
    true
}

impl Normalize for UserCreate {
    fn normalize(&mut self) {
        validation::trim(&mut self.first_name);
        validation::trim_opt(&mut self.last_name);
        validation::trim(&mut self.email);
        self.email = self.email.to_lowercase();
        validation::trim_opt(&mut self.phone);
    }
}

impl Normalize for UserUpdate {
    fn normalize(&mut self) {
        validation::trim(&mut self.first_name);
        validation::trim_opt(&mut self.last_name);
        validation::trim(&mut self.email);
        self.email = self.email.to_lowercase();
        validation::trim_opt(&mut self.phone);
        // Blank means "keep the current password"; anything else is taken verbatim
        if self.reset_password.as_deref().is_some_and(|p| p.trim().is_empty()) {
            self.reset_password = None;
        }
    }
}

/// `GET /api/users/is-email-available` query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAvailabilityQuery {
    #[serde(default)]
    pub email: String,
}

impl Normalize for EmailAvailabilityQuery {
    fn normalize(&mut self) {
        validation::trim(&mut self.email);
        self.email = self.email.to_lowercase();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAvailability {
    pub available: bool,
}

impl Normalize for ChangePassword {
    // Passwords are taken verbatim
    fn normalize(&mut self) {}
}

/// User list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role_id: Option<i64>,
    pub is_active: Option<bool>,
}

impl Normalize for UserFilter {
    fn normalize(&mut self) {
        validation::trim_opt(&mut self.name);
        validation::trim_opt(&mut self.email);
        validation::trim_opt(&mut self.phone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create() -> UserCreate {
        UserCreate {
            first_name: " Jane ".into(),
            last_name: Some("  ".into()),
            email: " Jane.Doe@Example.com ".into(),
            phone: None,
            password: "Str0ng!pass".into(),
            role_id: 1,
            is_active: true,
        }
    }

    #[test]
    fn display_name_falls_back_to_email() {
        assert_eq!(display_name("Jane", Some("Doe"), "j@x.io"), "Jane Doe");
        assert_eq!(display_name("Jane", None, "j@x.io"), "Jane");
        assert_eq!(display_name("", None, "j@x.io"), "j@x.io");
    }

    #[test]
    fn create_normalizes() {
        let mut payload = create();
        payload.normalize();
        assert_eq!(payload.first_name, "Jane");
        assert_eq!(payload.last_name, None);
        assert_eq!(payload.email, "jane.doe@example.com");
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn create_rejects_weak_password() {
        let mut payload = create();
        payload.password = "password".into();
        payload.normalize();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn reset_password_is_optional_but_checked() {
        let json = r#"{"first_name":"Jane","email":"jane@example.com","role_id":2}"#;
        let mut payload: UserUpdate = serde_json::from_str(json).unwrap();
        payload.normalize();
        assert!(payload.is_active);
        assert!(payload.reset_password.is_none());
        assert!(payload.validate().is_ok());

        payload.reset_password = Some("   ".into());
        payload.normalize();
        assert!(payload.reset_password.is_none());

        payload.reset_password = Some("weak".into());
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("reset_password"));
        assert!(!format!("{payload:?}").contains("weak"));
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            first_name: "Jane".into(),
            last_name: None,
            email: "jane@example.com".into(),
            phone: None,
            password_hash: "$argon2id$secret".into(),
            role_id: None,
            is_active: true,
            is_email_confirmed: false,
            last_login: None,
            created_by: None,
            created_at: 0,
            updated_by: None,
            updated_at: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password_hash"));
    }
}
