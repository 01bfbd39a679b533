//! Admin Server - 基于角色的后台管理服务
//!
//! # 架构概述
//!
//! - **认证** (`auth`): JWT + Argon2，权限解析与每请求授权闸门
//! - **数据库** (`db`): SQLite (sqlx) 存储、迁移与种子数据
//! - **审计** (`audit`): 所有管理操作写入审计日志
//! - **缓存** (`cache`): 列表接口的内存缓存
//! - **HTTP API** (`api`): RESTful 管理接口
//!
//! # 模块结构
//!
//! ```text
//! admin-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # JWT、权限解析、授权闸门、中间件
//! ├── api/           # HTTP 路由和处理器
//! ├── audit/         # 审计日志服务
//! ├── cache/         # 列表缓存
//! ├── db/            # 连接池、仓储、种子数据
//! └── utils/         # 日志、查询参数、请求校验
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod cache;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerError, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

pub use utils::logger::init_logger;

// Security logging macro - 写入 "security" target，字段语法同 tracing
#[macro_export]
macro_rules! security_log {
    ($level:ident, $event:expr $(, $($fields:tt)*)?) => {
        tracing::$level!(target: "security", event = $event $(, $($fields)*)?)
    };
}

pub fn print_banner() {
    println!(
        r#"
    ___       __          _
   /   | ____/ /___ ___  (_)___
  / /| |/ __  / __ `__ \/ / __ \
 / ___ / /_/ / / / / / / / / / /
/_/  |_\__,_/_/ /_/ /_/_/_/ /_/
    "#
    );
}
