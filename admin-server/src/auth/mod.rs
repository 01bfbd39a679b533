//! 认证授权模块
//!
//! 提供 JWT 认证、权限解析、授权闸门和中间件：
//! - [`JwtService`] - JWT 令牌服务
//! - [`AccountTokenService`] - 邮箱确认 / 密码重置链接令牌
//! - [`CurrentUser`] - 当前用户上下文 (仅身份)
//! - [`resolver`] - 角色 → 权限并集
//! - [`gate`] - 每次请求基于数据库的授权决策
//! - [`require_auth`] - 认证中间件
//! - [`require_permission`] - 权限检查中间件 (OR 语义)

pub mod account_token;
pub mod extractor;
pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod resolver;
pub mod store;

pub use account_token::{AccountPurpose, AccountTokenService};
pub use gate::{AccessContext, Decision, DenyReason, authorize};
pub use jwt::{Claims, CurrentUser, IssuedToken, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_permission};
pub use password::{hash_password, verify_password};
pub use store::{IdentityStore, PermissionCatalog};
