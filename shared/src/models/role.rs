//! Role Model

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Permission;
use crate::validation::{self, Normalize};

/// Role entity (RBAC 角色)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    /// Protected roles cannot be edited, toggled or deleted
    pub is_protected: bool,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_by: Option<i64>,
    pub updated_at: Option<i64>,
}

/// Role with its granted permissions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDetail {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// Active role for user-assignment dropdowns
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RoleOption {
    pub id: i64,
    pub name: String,
}

/// Create / update role payload
///
/// Permissions are replaced as a whole on update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RolePayload {
    #[validate(custom(function = "validation::validate_words"))]
    pub name: String,
    #[validate(custom(function = "validation::validate_description"))]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub permission_ids: Vec<i64>,
}

fn default_true() -> bool {
    true
}

impl Normalize for RolePayload {
    fn normalize(&mut self) {
        validation::trim(&mut self.name);
        validation::trim(&mut self.description);
        self.permission_ids.sort_unstable();
        self.permission_ids.dedup();
    }
}

/// Role list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleFilter {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl Normalize for RoleFilter {
    fn normalize(&mut self) {
        validation::trim_opt(&mut self.name);
        validation::trim_opt(&mut self.description);
    }
}
