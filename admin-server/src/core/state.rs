use std::sync::Arc;

use sqlx::SqlitePool;

use crate::audit::AuditService;
use crate::auth::{AccountTokenService, IdentityStore, JwtService, PermissionCatalog};
use crate::cache::ListCache;
use crate::core::{Config, Result};
use crate::db::{DbService, SqliteStore, seed};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求克隆一次。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | jwt_service | Arc<JwtService> | JWT 签发/校验 |
/// | account_tokens | Arc<AccountTokenService> | 邮箱确认 / 密码重置链接 |
/// | identity | Arc<dyn IdentityStore> | 用户与角色查询 (授权闸门) |
/// | catalog | Arc<dyn PermissionCatalog> | 角色 → 权限查询 (授权闸门) |
/// | audit | AuditService | 审计日志 |
/// | list_cache | Arc<ListCache> | 列表接口缓存 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub account_tokens: Arc<AccountTokenService>,
    pub identity: Arc<dyn IdentityStore>,
    pub catalog: Arc<dyn PermissionCatalog>,
    pub audit: AuditService,
    pub list_cache: Arc<ListCache>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("cached_lists", &self.list_cache.len())
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// 基于已打开的连接池创建状态，闸门直接读取该连接池
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let store = Arc::new(SqliteStore::new(pool.clone()));
        Self::with_stores(config, pool, store.clone(), store)
    }

    /// 指定闸门使用的存储实现 (测试中注入计数包装)
    pub fn with_stores(
        config: Config,
        pool: SqlitePool,
        identity: Arc<dyn IdentityStore>,
        catalog: Arc<dyn PermissionCatalog>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let account_tokens = Arc::new(AccountTokenService::new(&config.jwt));
        let list_cache = Arc::new(ListCache::new(config.list_cache_ttl));
        Self {
            audit: AuditService::new(pool.clone()),
            config,
            pool,
            jwt_service,
            account_tokens,
            identity,
            catalog,
            list_cache,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录
    /// 2. 数据库 (迁移)
    /// 3. 种子数据 (权限目录、系统角色、可选 SuperAdmin)
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db = DbService::new(&config.database_url).await?;
        seed::run(&db.pool, config.bootstrap_admin.as_ref()).await?;

        Ok(Self::new(config.clone(), db.pool))
    }
}
