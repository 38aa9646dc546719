//! Token 模块
//!
//! 提供双 Token 的签发、校验、刷新和序列化。
//!
//! ## 子模块
//!
//! - **claims**: Access / Refresh Token 的 claims 与过期校验
//! - **secret**: 签名密钥提供者
//! - **signer**: HS256 紧凑 JWT 的签名与校验
//! - **pair**: 对外的 [`TokenPair`]
//!
//! ## 示例
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::Duration;
//! use dualtoken::token::{StaticSecret, TokenPair};
//!
//! let secret = Arc::new(StaticSecret::new(b"my-secret-key-at-least-32-bytes!".to_vec()));
//!
//! // 超时时间为 0 时永久有效
//! let pair = TokenPair::issue("user123", secret, Duration::zero(), Duration::zero()).unwrap();
//! let claims = pair.verify_access().unwrap();
//! assert_eq!(claims.user_id, "user123");
//! ```

pub mod claims;
pub mod pair;
pub mod secret;
pub mod signer;

pub use claims::{AccessClaims, ExpiringClaims, PERMANENT, RefreshClaims};
pub use pair::TokenPair;
pub use secret::{EnvSecret, FnSecret, SecretProvider, StaticSecret};
