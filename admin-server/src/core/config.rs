use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::auth::JwtConfig;
use crate::auth::jwt::MIN_SECRET_LEN;
use crate::db::seed::BootstrapAdmin;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | DATABASE_URL | sqlite:{WORK_DIR}/admin.db | SQLite 连接串 |
/// | HTTP_PORT | 5000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | JWT_SECRET | (必填, ≥ 32 字节) | HS256 密钥 |
/// | JWT_EXPIRATION_MINUTES | 60 | 令牌有效期 |
/// | JWT_ISSUER | admin-server | 签发者 |
/// | JWT_AUDIENCE | admin-clients | 受众 |
/// | LIST_CACHE_TTL_SECS | 1800 | 列表缓存 TTL |
/// | APP_BASE_URL | http://localhost:3000 | 前端地址 (邮箱确认 / 密码重置链接) |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_JSON | false | JSON 格式日志 |
/// | SEED_ADMIN_EMAIL / SEED_ADMIN_PASSWORD | - | 首次启动创建 SuperAdmin |
///
/// # 示例
///
/// ```ignore
/// JWT_SECRET=... WORK_DIR=/data/admin HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志
    pub work_dir: PathBuf,
    pub database_url: String,
    pub http_port: u16,
    /// 运行环境: development | production
    pub environment: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    pub list_cache_ttl: Duration,
    /// 前端地址，账户链接以此为前缀
    pub app_base_url: String,
    pub request_timeout: Duration,
    pub log_level: String,
    pub log_json: bool,
    /// 首次启动时创建的 SuperAdmin (可选)
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("JWT_SECRET must be at least 32 bytes")]
    WeakSecret,

    #[error("SEED_ADMIN_EMAIL and SEED_ADMIN_PASSWORD must be set together")]
    IncompleteBootstrapAdmin,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 调用方负责先加载 `.env` (见 `main`)。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源加载配置 (测试使用闭包代替进程环境)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let work_dir = PathBuf::from(var("WORK_DIR").unwrap_or_else(|| "./data".into()));
        let database_url = var("DATABASE_URL")
            .unwrap_or_else(|| format!("sqlite:{}", work_dir.join("admin.db").display()));

        let secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret);
        }
        let expiration_minutes: i64 = parse(&var, "JWT_EXPIRATION_MINUTES", 60)?;
        if expiration_minutes <= 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRATION_MINUTES",
                value: expiration_minutes.to_string(),
            });
        }
        let jwt = JwtConfig {
            secret,
            expiration_minutes,
            issuer: var("JWT_ISSUER").unwrap_or_else(|| "admin-server".into()),
            audience: var("JWT_AUDIENCE").unwrap_or_else(|| "admin-clients".into()),
        };

        let bootstrap_admin = match (var("SEED_ADMIN_EMAIL"), var("SEED_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteBootstrapAdmin),
        };

        Ok(Self {
            work_dir,
            database_url,
            http_port: parse(&var, "HTTP_PORT", 5000)?,
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            jwt,
            list_cache_ttl: Duration::from_secs(parse(&var, "LIST_CACHE_TTL_SECS", 1800)?),
            app_base_url: var("APP_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "http://localhost:3000".into()),
            request_timeout: Duration::from_millis(parse(&var, "REQUEST_TIMEOUT_MS", 30_000)?),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: parse(&var, "LOG_JSON", false)?,
            bootstrap_admin,
        })
    }

    /// 日志目录
    pub fn log_dir(&self) -> PathBuf {
        self.work_dir.join("logs")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("JWT_SECRET", SECRET)]).unwrap();
        assert_eq!(config.http_port, 5000);
        assert_eq!(config.jwt.expiration_minutes, 60);
        assert_eq!(config.jwt.issuer, "admin-server");
        assert_eq!(config.list_cache_ttl, Duration::from_secs(1800));
        assert_eq!(config.database_url, "sqlite:./data/admin.db");
        assert_eq!(config.app_base_url, "http://localhost:3000");
        assert!(config.is_development());
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn secret_is_required_and_long_enough() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing("JWT_SECRET"));
        assert_eq!(load(&[("JWT_SECRET", "short")]).unwrap_err(), ConfigError::WeakSecret);
    }

    #[test]
    fn bad_numbers_are_reported() {
        let err = load(&[("JWT_SECRET", SECRET), ("HTTP_PORT", "eighty")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "HTTP_PORT",
                value: "eighty".into()
            }
        );
        assert!(load(&[("JWT_SECRET", SECRET), ("JWT_EXPIRATION_MINUTES", "0")]).is_err());
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("APP_BASE_URL", "https://admin.example.com/"),
        ]);
        assert_eq!(config.unwrap().app_base_url, "https://admin.example.com");
    }

    #[test]
    fn bootstrap_admin_needs_both_values() {
        let err = load(&[("JWT_SECRET", SECRET), ("SEED_ADMIN_EMAIL", "root@example.com")]);
        assert_eq!(err.unwrap_err(), ConfigError::IncompleteBootstrapAdmin);

        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("SEED_ADMIN_EMAIL", "root@example.com"),
            ("SEED_ADMIN_PASSWORD", "Str0ng!pass"),
        ])
        .unwrap();
        assert_eq!(config.bootstrap_admin.unwrap().email, "root@example.com");
    }
}
