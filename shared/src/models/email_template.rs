//! Email Template Model

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{self, Normalize};

/// Email template row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct EmailTemplate {
    pub id: i64,
    /// Unique key, e.g. `USER_CONFIRMATION`
    pub key: String,
    pub title: String,
    pub subject: String,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub is_active: bool,
    pub is_manual_mail: bool,
    /// HTML body
    pub body: String,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_by: Option<i64>,
    pub updated_at: Option<i64>,
}

/// Email template list row (without body)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct EmailTemplateListItem {
    pub id: i64,
    pub key: String,
    pub title: String,
    pub subject: String,
    pub is_active: bool,
    pub is_manual_mail: bool,
    pub created_at: i64,
}

/// Create / update email template payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmailTemplatePayload {
    #[validate(custom(function = "validation::validate_key"))]
    pub key: String,
    #[validate(custom(function = "validation::validate_title"))]
    pub title: String,
    #[validate(custom(function = "validation::validate_title"))]
    pub subject: String,
    #[validate(custom(function = "validation::validate_email"))]
    pub from_email: Option<String>,
    #[validate(custom(function = "validation::validate_words"))]
    pub from_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_manual_mail: bool,
    #[validate(custom(function = "validation::validate_body"))]
    pub body: String,
}

fn default_true() -> bool {
    true
}

impl Normalize for EmailTemplatePayload {
    fn normalize(&mut self) {
        validation::trim(&mut self.key);
        validation::trim(&mut self.title);
        validation::trim(&mut self.subject);
        validation::trim_opt(&mut self.from_email);
        validation::trim_opt(&mut self.from_name);
        validation::trim(&mut self.body);
    }
}

/// Email template list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailTemplateFilter {
    pub key: Option<String>,
    pub title: Option<String>,
    pub subject: Option<String>,
    pub is_active: Option<bool>,
}

impl Normalize for EmailTemplateFilter {
    fn normalize(&mut self) {
        validation::trim_opt(&mut self.key);
        validation::trim_opt(&mut self.title);
        validation::trim_opt(&mut self.subject);
    }
}
