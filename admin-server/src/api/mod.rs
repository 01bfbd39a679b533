//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录 / 当前用户 / 登出 / 注册 / 邮箱确认 / 重置密码
//! - [`roles`] - 角色管理
//! - [`permissions`] - 权限目录
//! - [`users`] - 用户管理
//! - [`cms`] - CMS 页面管理
//! - [`email_templates`] - 邮件模板管理
//! - [`audit_logs`] - 审计日志查询
//!
//! 每个受保护路由通过 `route_layer` 挂载
//! [`require_permission`](crate::auth::require_permission)，列出的权限满足其一即可。

pub mod audit_logs;
pub mod auth;
pub mod cms;
pub mod email_templates;
pub mod health;
pub mod permissions;
pub mod roles;
pub mod users;

pub use crate::utils::{ApiResponse, AppResult};
