//! 账户链接令牌
//!
//! 邮箱确认与密码重置链接中携带的一次性令牌。
//!
//! 与会话令牌共用 `JWT_SECRET`，但使用独立的受众 (`{audience}:{purpose}`)，
//! 会话令牌不能充当链接令牌，反之亦然。签名密钥混入用户当前的邮箱、
//! 密码哈希与确认状态：密码一旦重置、邮箱一旦确认，旧链接即失效。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::models::User;

use crate::auth::{JwtConfig, JwtError};

/// 链接用途
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountPurpose {
    ConfirmEmail,
    ResetPassword,
}

impl AccountPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfirmEmail => "confirm_email",
            Self::ResetPassword => "reset_password",
        }
    }

    /// 有效期
    pub fn lifetime(&self) -> Duration {
        match self {
            Self::ConfirmEmail => Duration::hours(24),
            Self::ResetPassword => Duration::hours(1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LinkClaims {
    sub: String,
    purpose: AccountPurpose,
    jti: String,
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
}

/// 账户链接令牌服务
#[derive(Clone)]
pub struct AccountTokenService {
    secret: String,
    issuer: String,
    audience: String,
}

impl std::fmt::Debug for AccountTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountTokenService")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl AccountTokenService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }

    /// 为 `user` 签发指定用途的链接令牌
    pub fn issue(&self, user: &User, purpose: AccountPurpose) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = LinkClaims {
            sub: user.id.to_string(),
            purpose,
            jti: uuid::Uuid::new_v4().to_string(),
            exp: (now + purpose.lifetime()).timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience_for(purpose),
        };

        let key = EncodingKey::from_secret(&self.key_material(user, purpose));
        encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 校验令牌属于 `user` 且用途一致，用户状态变化后的旧令牌校验失败
    pub fn verify(
        &self,
        token: &str,
        user: &User,
        purpose: AccountPurpose,
    ) -> Result<(), JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience_for(purpose)]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);
        validation.leeway = 0;

        let key = DecodingKey::from_secret(&self.key_material(user, purpose));
        let data = decode::<LinkClaims>(token, &key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            _ => JwtError::InvalidToken(e.to_string()),
        })?;

        if data.claims.purpose != purpose || data.claims.sub != user.id.to_string() {
            return Err(JwtError::InvalidToken("Token does not match account".into()));
        }
        Ok(())
    }

    fn audience_for(&self, purpose: AccountPurpose) -> String {
        format!("{}:{}", self.audience, purpose.as_str())
    }

    fn key_material(&self, user: &User, purpose: AccountPurpose) -> Vec<u8> {
        format!(
            "{}|{}|{}|{}|{}",
            self.secret,
            purpose.as_str(),
            user.email,
            user.password_hash,
            user.is_email_confirmed
        )
        .into_bytes()
    }
}
