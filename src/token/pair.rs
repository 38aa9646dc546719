//! 双 Token（Access + Refresh）
//!
//! [`TokenPair`] 是对外的基本单元：两个已签名字符串，加上一个不参与序列化的密钥提供者。
//!
//! - Access Token 携带用户 ID，有效期短
//! - Refresh Token 携带与之一同签发的 Access Token 原文，有效期长
//!
//! 签发时先签 Access Token，再把它写进 Refresh claims 后签 Refresh Token；
//! 任一步失败都不会返回半成品。
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::Duration;
//! use dualtoken::{StaticSecret, TokenPair};
//!
//! let secret = Arc::new(StaticSecret::new(b"my-secret-key-at-least-32-bytes!".to_vec()));
//! let mut pair = TokenPair::issue("user123", secret.clone(), Duration::minutes(15), Duration::days(7)).unwrap();
//!
//! let claims = pair.verify_access().unwrap();
//! assert_eq!(claims.user_id, "user123");
//!
//! // 存储时密钥不会被序列化，取回时必须显式重新绑定
//! let json = pair.to_json().unwrap();
//! let restored = TokenPair::from_json(&json, secret).unwrap();
//! assert_eq!(restored.access_token, pair.access_token);
//!
//! // 用 Refresh Token 换一对新的
//! pair.rotate(Duration::minutes(15), Duration::days(7)).unwrap();
//! assert_ne!(restored.access_token, pair.access_token);
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::config::TokenConfig;
use crate::error::{Error, Result, TokenError};
use crate::random::constant_time_compare_str;
use crate::token::claims::{AccessClaims, RefreshClaims};
use crate::token::secret::SecretProvider;
use crate::token::signer;

/// Access Token 和 Refresh Token 对
///
/// 序列化形式只有 `access_token` 和 `refresh_token` 两个字段。
/// 直接用 serde 反序列化得到的实例没有绑定密钥，
/// 需要 [`TokenPair::bind_secret`] 后才能校验或刷新。
///
/// 同一个实例的刷新需要 `&mut self`，跨线程共享时由调用方加锁。
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access Token（短期有效）
    pub access_token: String,

    /// Refresh Token（长期有效）
    pub refresh_token: String,

    #[serde(skip)]
    secret: Option<Arc<dyn SecretProvider>>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &self.access_token)
            .field("refresh_token", &self.refresh_token)
            .field("secret_bound", &self.secret.is_some())
            .finish()
    }
}

impl TokenPair {
    /// 签发新的 Token 对
    ///
    /// 有效期为零时对应的 token 永久有效。
    pub fn issue(
        user_id: impl Into<String>,
        secret: Arc<dyn SecretProvider>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self> {
        Self::issue_at(user_id, secret, access_ttl, refresh_ttl, Utc::now())
    }

    /// 按配置中的有效期签发
    pub fn issue_with_config(
        user_id: impl Into<String>,
        secret: Arc<dyn SecretProvider>,
        config: &TokenConfig,
    ) -> Result<Self> {
        config.validate()?;
        Self::issue(user_id, secret, config.access_ttl, config.refresh_ttl)
    }

    /// 以指定签发时间签发
    pub fn issue_at(
        user_id: impl Into<String>,
        secret: Arc<dyn SecretProvider>,
        access_ttl: Duration,
        refresh_ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let user_id = user_id.into();

        let access_claims = AccessClaims::new_at(user_id.as_str(), access_ttl, now)?;
        let access_token = signer::sign(&access_claims, secret.as_ref())?;

        // Refresh claims 引用已签名的 Access Token，必须在其之后构建
        let refresh_claims = RefreshClaims::new_at(access_token.as_str(), refresh_ttl, now)?;
        let refresh_token = signer::sign(&refresh_claims, secret.as_ref())?;

        debug!(
            user_id = %user_id,
            access_ttl_secs = access_ttl.num_seconds(),
            refresh_ttl_secs = refresh_ttl.num_seconds(),
            "issued token pair"
        );

        Ok(Self {
            access_token,
            refresh_token,
            secret: Some(secret),
        })
    }

    /// 由已有的两个字符串构建，并绑定密钥
    pub fn from_parts(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        secret: Arc<dyn SecretProvider>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            secret: Some(secret),
        }
    }

    /// 绑定（或替换）密钥提供者
    pub fn bind_secret(&mut self, secret: Arc<dyn SecretProvider>) {
        self.secret = Some(secret);
    }

    /// 是否已绑定密钥提供者
    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// 校验 Access Token
    pub fn verify_access(&self) -> Result<AccessClaims> {
        self.verify_access_at(Utc::now())
    }

    /// 以指定时间校验 Access Token
    pub fn verify_access_at(&self, now: DateTime<Utc>) -> Result<AccessClaims> {
        let secret = self.provider()?;
        signer::verify_at(&self.access_token, secret, now)
            .inspect_err(|e| log_rejection("access", e))
    }

    /// 校验 Refresh Token
    ///
    /// 只有 Refresh Token 自身的签名和过期时间决定结果；
    /// 绑定的 Access Token 只需能解码出 claims，过期与否不影响。
    pub fn verify_refresh(&self) -> Result<RefreshClaims> {
        self.verify_refresh_at(Utc::now())
    }

    /// 以指定时间校验 Refresh Token
    pub fn verify_refresh_at(&self, now: DateTime<Utc>) -> Result<RefreshClaims> {
        let secret = self.provider()?;
        let claims: RefreshClaims = signer::verify_at(&self.refresh_token, secret, now)
            .inspect_err(|e| log_rejection("refresh", e))?;

        claims
            .bound_access_claims()
            .inspect_err(|e| log_rejection("bound access", e))?;
        Ok(claims)
    }

    /// Refresh Token 绑定的是否为当前的 Access Token
    ///
    /// 不校验签名，只用于诊断。
    pub fn is_bound(&self) -> bool {
        signer::decode_unverified::<RefreshClaims>(&self.refresh_token)
            .map(|claims| constant_time_compare_str(&claims.access_token, &self.access_token))
            .unwrap_or(false)
    }

    /// 重新签发并原地替换两个 token
    ///
    /// 失败时原有的 token 对保持不变。
    pub fn refresh(
        &mut self,
        user_id: impl Into<String>,
        secret: Arc<dyn SecretProvider>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<()> {
        self.refresh_at(user_id, secret, access_ttl, refresh_ttl, Utc::now())
    }

    /// 以指定时间重新签发
    pub fn refresh_at(
        &mut self,
        user_id: impl Into<String>,
        secret: Arc<dyn SecretProvider>,
        access_ttl: Duration,
        refresh_ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let fresh = Self::issue_at(user_id, secret, access_ttl, refresh_ttl, now)?;
        *self = fresh;
        debug!("refreshed token pair");
        Ok(())
    }

    /// 使用 Refresh Token 换发新的 Token 对，无需重新认证用户
    ///
    /// 要求 Refresh Token 有效，且其绑定的 Access Token 就是当前的 Access Token；
    /// 用户 ID 取自绑定的 Access Token。返回旧 Access Token 的 claims。
    pub fn rotate(&mut self, access_ttl: Duration, refresh_ttl: Duration) -> Result<AccessClaims> {
        self.rotate_at(access_ttl, refresh_ttl, Utc::now())
    }

    /// 以指定时间换发
    pub fn rotate_at(
        &mut self,
        access_ttl: Duration,
        refresh_ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<AccessClaims> {
        let secret = self
            .secret
            .clone()
            .ok_or_else(|| Error::invalid_secret("token pair has no secret provider bound"))?;

        let refresh_claims = self.verify_refresh_at(now)?;
        if !constant_time_compare_str(&refresh_claims.access_token, &self.access_token) {
            debug!("refresh token is bound to a different access token");
            return Err(TokenError::BindingMismatch.into());
        }
        let previous = refresh_claims.bound_access_claims()?;

        let fresh = Self::issue_at(
            previous.user_id.as_str(),
            secret,
            access_ttl,
            refresh_ttl,
            now,
        )?;
        *self = fresh;
        debug!(user_id = %previous.user_id, "rotated token pair");
        Ok(previous)
    }

    /// 序列化为 JSON（不含密钥）
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// 序列化为 JSON 字节（不含密钥）
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// 从 JSON 反序列化，并显式绑定密钥提供者
    pub fn from_json(json: impl AsRef<[u8]>, secret: Arc<dyn SecretProvider>) -> Result<Self> {
        let mut pair: TokenPair = serde_json::from_slice(json.as_ref())?;
        pair.bind_secret(secret);
        Ok(pair)
    }

    fn provider(&self) -> Result<&dyn SecretProvider> {
        self.secret
            .as_deref()
            .ok_or_else(|| Error::invalid_secret("token pair has no secret provider bound"))
    }
}

fn log_rejection(which: &str, err: &Error) {
    let kind = err.token_error().map(TokenError::kind).unwrap_or("other");
    debug!(token = which, kind, "token verification failed");
}
