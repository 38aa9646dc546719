//! 签名密钥提供者
//!
//! 密钥以能力（capability）的形式传入每一次签名和校验，而不是全局变量。
//! 核心代码每次都会重新调用 [`SecretProvider::secret`]，不做缓存，
//! 因此背后是可轮换密钥的实现无需改动核心即可生效。
//!
//! ```rust
//! use dualtoken::token::secret::{SecretProvider, StaticSecret};
//!
//! let secret = StaticSecret::new(b"my-secret-key-at-least-32-bytes!".to_vec());
//! assert_eq!(secret.secret().unwrap().len(), 32);
//! // Debug 输出不会泄露密钥
//! assert!(!format!("{:?}", secret).contains("my-secret"));
//! ```

use std::env;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result, TokenError};
use crate::random::generate_random_bytes;

/// 默认读取的密钥环境变量
pub const DEFAULT_SECRET_ENV: &str = "DUALTOKEN_SECRET";

/// 签名 / 校验密钥的提供者
///
/// 必须可以被多个线程同时调用。
pub trait SecretProvider: Send + Sync {
    /// 返回 HMAC 密钥原始字节
    fn secret(&self) -> Result<Vec<u8>>;
}

impl<T: SecretProvider + ?Sized> SecretProvider for Arc<T> {
    fn secret(&self) -> Result<Vec<u8>> {
        (**self).secret()
    }
}

impl<T: SecretProvider + ?Sized> SecretProvider for &T {
    fn secret(&self) -> Result<Vec<u8>> {
        (**self).secret()
    }
}

/// 固定密钥
#[derive(Clone)]
pub struct StaticSecret {
    key: Vec<u8>,
}

impl StaticSecret {
    /// 使用给定字节创建
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    /// 生成随机密钥（开发和测试用）
    pub fn generate(length: usize) -> Result<Self> {
        Ok(Self::new(generate_random_bytes(length)?))
    }
}

impl fmt::Debug for StaticSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSecret")
            .field("key", &format_args!("[REDACTED; {} bytes]", self.key.len()))
            .finish()
    }
}

impl SecretProvider for StaticSecret {
    fn secret(&self) -> Result<Vec<u8>> {
        Ok(self.key.clone())
    }
}

/// 每次调用时从环境变量读取的密钥
#[derive(Debug, Clone)]
pub struct EnvSecret {
    var: String,
}

impl EnvSecret {
    /// 从指定环境变量读取
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// 环境变量名
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvSecret {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET_ENV)
    }
}

impl SecretProvider for EnvSecret {
    fn secret(&self) -> Result<Vec<u8>> {
        match env::var(&self.var) {
            Ok(value) if !value.is_empty() => Ok(value.into_bytes()),
            Ok(_) => Err(TokenError::InvalidSecret(format!("{} is empty", self.var)).into()),
            Err(_) => Err(TokenError::InvalidSecret(format!("{} is not set", self.var)).into()),
        }
    }
}

/// 由闭包提供的密钥
///
/// 适合接入密钥管理服务或配置中心。
pub struct FnSecret<F> {
    f: F,
}

impl<F> FnSecret<F>
where
    F: Fn() -> Result<Vec<u8>> + Send + Sync,
{
    /// 包装闭包
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnSecret<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSecret").finish_non_exhaustive()
    }
}

impl<F> SecretProvider for FnSecret<F>
where
    F: Fn() -> Result<Vec<u8>> + Send + Sync,
{
    fn secret(&self) -> Result<Vec<u8>> {
        (self.f)()
    }
}

/// 从提供者取出密钥，拒绝空密钥
///
/// 提供者返回的任何错误都归为 [`TokenError::InvalidSecret`]。
pub(crate) fn fetch_key(provider: &dyn SecretProvider) -> Result<Vec<u8>> {
    let key = provider.secret().map_err(|e| match e {
        Error::Token(TokenError::InvalidSecret(_)) => e,
        other => Error::Token(TokenError::InvalidSecret(other.to_string())),
    })?;
    if key.is_empty() {
        return Err(TokenError::InvalidSecret(
            "secret provider returned an empty key".to_string(),
        )
        .into());
    }
    Ok(key)
}
