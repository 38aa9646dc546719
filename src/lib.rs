//! # dualtoken
//!
//! 双 Token（Access Token + Refresh Token）签发与校验库。
//!
//! ## 功能特性
//!
//! - **签发**: 为用户 ID 同时签发短期 Access Token 和长期 Refresh Token
//! - **校验**: 区分过期、签名无效、格式错误和算法不符
//! - **刷新**: Refresh Token 绑定与之一同签发的 Access Token，可凭其换发新的一对
//! - **永久有效**: 有效期为 0 的 token 永不过期
//! - **密钥注入**: 密钥由 [`SecretProvider`] 在每次签名/校验时提供，不进入序列化结果
//!
//! 签名算法固定为 HMAC-SHA256（HS256），其它算法的 token 一律拒绝。
//!
//! 本库不负责传输、存储、撤销列表和用户密码校验，这些由上层系统提供。
//!
//! ## 示例
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::Duration;
//! use dualtoken::{StaticSecret, TokenError, TokenPair};
//!
//! let secret = Arc::new(StaticSecret::new(b"my-secret-key-at-least-32-bytes!".to_vec()));
//!
//! let mut pair = TokenPair::issue(
//!     "user123",
//!     secret.clone(),
//!     Duration::minutes(15),
//!     Duration::days(7),
//! )
//! .unwrap();
//!
//! match pair.verify_access() {
//!     Ok(claims) => assert_eq!(claims.user_id, "user123"),
//!     Err(e) if e.is_expired() => {
//!         pair.rotate(Duration::minutes(15), Duration::days(7)).unwrap();
//!     }
//!     Err(e) => panic!("rejected: {}", e),
//! }
//!
//! // 篡改过的 token 不会通过校验
//! pair.access_token.push('x');
//! let err = pair.verify_access().unwrap_err();
//! assert!(matches!(
//!     err.token_error(),
//!     Some(TokenError::InvalidSignature | TokenError::MalformedToken(_))
//! ));
//! ```
//!
//! ## 日志
//!
//! 签发、刷新和校验失败会通过 `tracing` 输出 debug 级别事件，
//! 只记录用户 ID、有效期和错误类型，不记录密钥和 token 原文。

pub mod config;
pub mod error;
pub mod random;
pub mod token;

pub use config::TokenConfig;
pub use error::{Error, Result, TokenError};

// ============================================================================
// Token 相关导出
// ============================================================================

pub use token::{
    AccessClaims, EnvSecret, ExpiringClaims, FnSecret, RefreshClaims, SecretProvider,
    StaticSecret, TokenPair,
};
