//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] / [`ApiResponse`] - 统一错误与响应 (from shared::error)
//! - [`logger`] - tracing 日志初始化
//! - [`query`] - 列表分页/排序校验
//! - [`validation`] - 请求体规范化与校验

pub mod logger;
pub mod query;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
