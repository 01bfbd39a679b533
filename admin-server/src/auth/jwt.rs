//! JWT 令牌服务
//!
//! 处理 JWT 令牌的生成、验证和解析。
//!
//! 令牌中的 `role` / `permission` 声明仅供前端展示使用，
//! 授权决策始终由 [`crate::auth::gate`] 基于数据库实时计算。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::models::User;
use thiserror::Error;

/// HS256 密钥最小长度 (字节)
pub const MIN_SECRET_LEN: usize = 32;

/// JWT 配置
///
/// 由 [`crate::core::Config::from_env`] 构造，密钥缺失或过短时启动失败。
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// JWT 密钥 (至少 32 字节)
    pub secret: String,
    /// 令牌过期时间 (分钟)
    pub expiration_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_minutes", &self.expiration_minutes)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    pub email: String,
    /// 显示名称 ("First Last")
    pub name: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    /// 角色名称 (签发时快照)
    #[serde(default)]
    pub role: Vec<String>,
    /// 权限列表 (签发时快照)
    #[serde(default)]
    pub permission: Vec<String>,
    /// 令牌 ID
    pub jti: String,
    /// 过期时间戳 (秒)
    pub exp: i64,
    /// 签发时间戳 (秒)
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// 签发结果
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// 过期时间 (Unix 毫秒)
    pub expires_at: i64,
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 为用户签发新令牌
    ///
    /// `roles` / `permissions` 为登录时解析出的快照，仅用于前端展示。
    pub fn issue(
        &self,
        user: &User,
        roles: &[String],
        permissions: &[String],
    ) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.display_name(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: roles.to_vec(),
            permission: permissions.to_vec(),
            jti: uuid::Uuid::new_v4().to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at: expiration.timestamp_millis(),
        })
    }

    /// 验证并解码令牌
    ///
    /// 仅接受 HS256；校验签发者、受众与过期时间 (无宽限期)。
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// 当前用户上下文 (从 JWT Claims 解析)
///
/// 由 [`crate::auth::require_auth`] 创建并注入请求扩展。
/// 只携带身份，不携带权限：权限由授权闸门实时计算。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 用户 ID
    pub id: i64,
    pub email: String,
    /// 显示名称 (审计日志操作人)
    pub display_name: String,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| JwtError::InvalidToken(format!("Invalid subject: {}", claims.sub)))?;

        Ok(Self {
            id,
            email: claims.email,
            display_name: claims.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
            expiration_minutes: 60,
            issuer: "admin-server".to_string(),
            audience: "admin-clients".to_string(),
        }
    }

    fn user() -> User {
        User {
            id: 42,
            first_name: "Jane".into(),
            last_name: Some("Doe".into()),
            email: "jane@example.com".into(),
            phone: None,
            password_hash: String::new(),
            role_id: Some(7),
            is_active: true,
            is_email_confirmed: true,
            last_login: None,
            created_by: None,
            created_at: 0,
            updated_by: None,
            updated_at: None,
        }
    }

    #[test]
    fn issue_and_validate() {
        let service = JwtService::with_config(config());
        let roles = vec!["Manager".to_string()];
        let permissions = vec!["Users.List".to_string(), "Users.Add".to_string()];

        let issued = service.issue(&user(), &roles, &permissions).unwrap();
        let claims = service.validate_token(&issued.token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.name, "Jane Doe");
        assert_eq!(claims.role, roles);
        assert_eq!(claims.permission, permissions);
        assert_eq!(claims.iss, "admin-server");
        assert_eq!(claims.aud, "admin-clients");
        assert_eq!(claims.exp - claims.iat, 60 * 60);
        assert!(issued.expires_at > Utc::now().timestamp_millis());
    }

    #[test]
    fn tokens_have_unique_ids() {
        let service = JwtService::with_config(config());
        let a = service.validate_token(&service.issue(&user(), &[], &[]).unwrap().token);
        let b = service.validate_token(&service.issue(&user(), &[], &[]).unwrap().token);
        assert_ne!(a.unwrap().jti, b.unwrap().jti);
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut cfg = config();
        cfg.expiration_minutes = -1;
        let service = JwtService::with_config(cfg);
        let issued = service.issue(&user(), &[], &[]).unwrap();

        assert!(matches!(
            service.validate_token(&issued.token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = JwtService::with_config(config());
        let mut other = config();
        other.secret = "ffffffffffffffffffffffffffffffff".to_string();
        let verifier = JwtService::with_config(other);

        let issued = issuer.issue(&user(), &[], &[]).unwrap();
        assert!(matches!(
            verifier.validate_token(&issued.token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let issuer = JwtService::with_config(config());
        let mut other = config();
        other.audience = "someone-else".to_string();
        let verifier = JwtService::with_config(other);

        let issued = issuer.issue(&user(), &[], &[]).unwrap();
        assert!(verifier.validate_token(&issued.token).is_err());
    }

    #[test]
    fn extract_bearer() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
    }

    #[test]
    fn current_user_from_claims() {
        let service = JwtService::with_config(config());
        let issued = service.issue(&user(), &[], &[]).unwrap();
        let claims = service.validate_token(&issued.token).unwrap();

        let current = CurrentUser::try_from(claims.clone()).unwrap();
        assert_eq!(current.id, 42);
        assert_eq!(current.display_name, "Jane Doe");

        let mut bad = claims;
        bad.sub = "not-a-number".into();
        assert!(CurrentUser::try_from(bad).is_err());
    }
}
