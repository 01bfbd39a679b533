//! Audit Log Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Audit entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditType {
    Authentication,
    View,
    Create,
    Update,
    Delete,
    Export,
}

impl AuditType {
    pub const ALL: [AuditType; 6] = [
        AuditType::Authentication,
        AuditType::View,
        AuditType::Create,
        AuditType::Update,
        AuditType::Delete,
        AuditType::Export,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditType::Authentication => "Authentication",
            AuditType::View => "View",
            AuditType::Create => "Create",
            AuditType::Update => "Update",
            AuditType::Delete => "Delete",
            AuditType::Export => "Export",
        }
    }
}

impl fmt::Display for AuditType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown audit type: {s}"))
    }
}

/// Audit log row (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AuditLog {
    pub id: i64,
    /// Display name of the actor
    pub user_name: String,
    /// Stored as the [`AuditType`] name
    #[serde(rename = "type")]
    #[cfg_attr(feature = "db", sqlx(rename = "type"))]
    pub kind: String,
    pub activity: String,
    pub timestamp: i64,
}

/// Audit log list filters
///
/// `user_name` and `activity` match substrings, `from`/`to` are inclusive
/// Unix millis bounds on `timestamp`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLogFilter {
    pub user_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub activity: Option<String>,
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl crate::validation::Normalize for AuditLogFilter {
    fn normalize(&mut self) {
        crate::validation::trim_opt(&mut self.user_name);
        crate::validation::trim_opt(&mut self.kind);
        crate::validation::trim_opt(&mut self.activity);
    }
}
