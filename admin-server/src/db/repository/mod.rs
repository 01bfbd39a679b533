//! Repository Module
//!
//! Free async functions over a `SqlitePool`, one module per table.
//! SQL is written out per query and bound with `?N` placeholders; the only
//! interpolated fragment is the ORDER BY column, taken from
//! [`crate::utils::query::ListQuery`].

pub mod audit_log;
pub mod cms;
pub mod email_template;
pub mod permission;
pub mod role;
pub mod user;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Business rule violation with a specific error code
    #[error("{1}")]
    Business(ErrorCode, String),
}

impl RepoError {
    pub fn business(code: ErrorCode) -> Self {
        RepoError::Business(code, code.message().to_string())
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::database(msg)
            }
            RepoError::Business(code, msg) => AppError::with_message(code, msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// `LIKE` pattern operand for the `?N IS NULL OR col LIKE '%' || ?N || '%'` filters
///
/// `%` and `_` typed by the user are matched literally.
pub(crate) fn like_escape(value: Option<&str>) -> Option<String> {
    value.map(|v| {
        v.replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    })
}
