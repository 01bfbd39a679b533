//! Shared types for the admin backend
//!
//! Common types used by admin-server and mirrored by the admin frontend:
//! error codes, the API response envelope, request/response models and
//! input validation rules.

pub mod error;
pub mod models;
pub mod util;
pub mod validation;

// Re-exports
pub use axum::Json;
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
pub use validation::Normalize;
