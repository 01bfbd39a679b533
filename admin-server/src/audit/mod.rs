//! 审计日志模块
//!
//! # 架构
//!
//! ```text
//! handler 完成操作
//!   └─ AuditService::log(actor, type, activity) → SQLite (audit_log 表)
//! ```
//!
//! - **Append-only**: 无删除/更新接口
//! - **同步写入**: handler 等待写入完成，写入失败返回 500
//! - **Actor**: 记录操作者的显示名称 (而非 ID)

pub mod service;

pub use service::AuditService;
