//! 启动与运行期错误
//!
//! 请求级错误统一使用 [`crate::utils::AppError`]；这里只覆盖进程级失败，
//! 由 `main` 打印后退出。

use thiserror::Error;

use super::config::ConfigError;
use crate::db::repository::RepoError;
use crate::utils::AppError;
use crate::utils::logger::LoggerError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("日志初始化失败: {0}")]
    Logger(#[from] LoggerError),

    #[error("数据库初始化失败: {0}")]
    Database(#[from] AppError),

    #[error("种子数据写入失败: {0}")]
    Seed(#[from] RepoError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 启动流程的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
