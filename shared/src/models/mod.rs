//! Data models
//!
//! Shared between admin-server and the admin frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflake ids, all timestamps Unix millis.

pub mod audit_log;
pub mod auth;
pub mod cms;
pub mod email_template;
pub mod page;
pub mod permission;
pub mod role;
pub mod user;

// Re-exports
pub use audit_log::*;
pub use auth::*;
pub use cms::*;
pub use email_template::*;
pub use page::*;
pub use permission::*;
pub use role::*;
pub use user::*;
