//! Access / Refresh Token 的 claims 定义
//!
//! 两种 claims 都携带过期时间和 nonce，并通过 [`ExpiringClaims`] 共享同一套过期校验。
//! 过期时间是 Unix 时间戳（秒），`0` 表示永久有效，与"在 1970 年过期"不是一回事。
//!
//! 线上字段名保持短小：
//!
//! | 字段 | AccessClaims | RefreshClaims |
//! |------|--------------|---------------|
//! | 用户 ID | `uid` | - |
//! | 绑定的 Access Token | - | `atk` |
//! | 过期时间 | `exp` | `exp` |
//! | nonce | `rdm` | `rdm` |

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TokenError};
use crate::random::generate_nonce;
use crate::token::signer;

/// 永久有效的过期时间标记
pub const PERMANENT: u64 = 0;

/// 带过期时间的 claims
pub trait ExpiringClaims {
    /// 过期时间（Unix 秒），[`PERMANENT`] 表示永久有效
    fn expire_at(&self) -> u64;

    /// 是否永久有效
    fn is_permanent(&self) -> bool {
        self.expire_at() == PERMANENT
    }

    /// 过期时间，永久有效时为 `None`
    ///
    /// 超出 chrono 可表示范围的过期时间返回 `DateTime::<Utc>::MAX_UTC`，不会与永久有效混淆。
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.is_permanent() {
            return None;
        }
        let at = i64::try_from(self.expire_at())
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Some(at)
    }

    /// 以当前时间校验
    fn validate(&self) -> Result<()> {
        self.validate_at(Utc::now())
    }

    /// 以指定时间校验
    ///
    /// `now` 严格晚于过期时间才算过期。
    fn validate_at(&self, now: DateTime<Utc>) -> Result<()> {
        let exp = self.expire_at();
        if exp == PERMANENT {
            return Ok(());
        }
        let exp = i64::try_from(exp).unwrap_or(i64::MAX);
        if now.timestamp() > exp {
            return Err(TokenError::Expired.into());
        }
        Ok(())
    }
}

/// 根据签发时间和有效期计算过期时间
///
/// 有效期不大于零时返回 [`PERMANENT`]。
pub(crate) fn expiry_from(now: DateTime<Utc>, ttl: Duration) -> u64 {
    if ttl <= Duration::zero() {
        return PERMANENT;
    }
    // 不能落到 0 上，否则会被当成永久有效
    now.timestamp().saturating_add(ttl.num_seconds()).max(1) as u64
}

/// Access Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// 用户 ID，由调用方提供，不做格式校验
    #[serde(rename = "uid")]
    pub user_id: String,

    /// 过期时间（Unix 秒），0 表示永久有效
    #[serde(rename = "exp")]
    pub expire_at: u64,

    /// 每次签发唯一的随机值
    #[serde(rename = "rdm")]
    pub nonce: String,
}

impl AccessClaims {
    /// 以当前时间创建
    pub fn new(user_id: impl Into<String>, ttl: Duration) -> Result<Self> {
        Self::new_at(user_id, ttl, Utc::now())
    }

    /// 以指定签发时间创建
    pub fn new_at(user_id: impl Into<String>, ttl: Duration, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            user_id: user_id.into(),
            expire_at: expiry_from(now, ttl),
            nonce: generate_nonce()?,
        })
    }
}

impl ExpiringClaims for AccessClaims {
    fn expire_at(&self) -> u64 {
        self.expire_at
    }
}

/// Refresh Token claims
///
/// `access_token` 是与之一同签发的 Access Token 原文，
/// 刷新时据此找回用户身份，也据此确认两者是同一对。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// 绑定的 Access Token（已签名的紧凑字符串）
    #[serde(rename = "atk")]
    pub access_token: String,

    /// 过期时间（Unix 秒），0 表示永久有效
    #[serde(rename = "exp")]
    pub expire_at: u64,

    /// 每次签发唯一的随机值
    #[serde(rename = "rdm")]
    pub nonce: String,
}

impl RefreshClaims {
    /// 以当前时间创建
    pub fn new(access_token: impl Into<String>, ttl: Duration) -> Result<Self> {
        Self::new_at(access_token, ttl, Utc::now())
    }

    /// 以指定签发时间创建
    pub fn new_at(
        access_token: impl Into<String>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            access_token: access_token.into(),
            expire_at: expiry_from(now, ttl),
            nonce: generate_nonce()?,
        })
    }

    /// 解码绑定的 Access Token 的 claims
    ///
    /// 不校验内层签名和过期时间：Refresh Token 的有效性只由它自身决定，
    /// 内层 token 早已过期是正常情况。
    pub fn bound_access_claims(&self) -> Result<AccessClaims> {
        signer::decode_unverified(&self.access_token)
    }
}

impl ExpiringClaims for RefreshClaims {
    fn expire_at(&self) -> u64 {
        self.expire_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn at(ts: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(ts, 0).unwrap()
    }

    #[test]
    fn test_zero_ttl_is_permanent() {
        let claims = AccessClaims::new_at("abcd", Duration::zero(), at(1_700_000_000)).unwrap();
        assert_eq!(claims.expire_at, PERMANENT);
        assert!(claims.is_permanent());
        assert!(claims.expires_at().is_none());

        // 无论时间走多远都不会过期
        assert!(claims.validate_at(at(32_503_680_000)).is_ok());
        assert!(claims.validate().is_ok());
    }

    #[test]
    fn test_negative_ttl_is_permanent() {
        let claims = AccessClaims::new("abcd", Duration::seconds(-30)).unwrap();
        assert!(claims.is_permanent());
    }

    #[test]
    fn test_expiry_boundary() {
        let issued = at(1_700_000_000);
        let claims = AccessClaims::new_at("abcd", Duration::seconds(5), issued).unwrap();
        assert_eq!(claims.expire_at, 1_700_000_005);

        assert!(claims.validate_at(issued + Duration::seconds(5)).is_ok());
        let err = claims
            .validate_at(issued + Duration::seconds(6))
            .unwrap_err();
        assert!(matches!(err, Error::Token(TokenError::Expired)));
    }

    #[test]
    fn test_expiry_never_lands_on_sentinel() {
        // 在纪元附近签发的短期 token 不应变成永久有效
        let claims = AccessClaims::new_at("abcd", Duration::milliseconds(10), at(0)).unwrap();
        assert!(!claims.is_permanent());
    }

    #[test]
    fn test_nonce_differs_between_calls() {
        let now = Utc::now();
        let a = AccessClaims::new_at("abcd", Duration::zero(), now).unwrap();
        let b = AccessClaims::new_at("abcd", Duration::zero(), now).unwrap();
        assert_eq!(a.user_id, b.user_id);
        assert_eq!(a.expire_at, b.expire_at);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a, b);
    }

    #[test]
    fn test_wire_field_names() {
        let claims = AccessClaims {
            user_id: "1234".to_string(),
            expire_at: 42,
            nonce: "n".to_string(),
        };
        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(json, r#"{"uid":"1234","exp":42,"rdm":"n"}"#);

        let refresh = RefreshClaims {
            access_token: "a.b.c".to_string(),
            expire_at: 0,
            nonce: "n".to_string(),
        };
        let json = serde_json::to_string(&refresh).unwrap();
        assert_eq!(json, r#"{"atk":"a.b.c","exp":0,"rdm":"n"}"#);
    }

    #[test]
    fn test_refresh_claims_expiry_independent() {
        let issued = at(1_700_000_000);
        let refresh = RefreshClaims::new_at("a.b.c", Duration::hours(1), issued).unwrap();
        assert_eq!(refresh.expire_at, 1_700_003_600);
        assert_eq!(
            refresh.expires_at(),
            Some(issued + Duration::hours(1))
        );
    }

    #[test]
    fn test_bound_access_claims_rejects_garbage() {
        let refresh = RefreshClaims::new("not-a-token", Duration::zero()).unwrap();
        let err = refresh.bound_access_claims().unwrap_err();
        assert!(matches!(err, Error::Token(TokenError::MalformedToken(_))));
    }

    #[test]
    fn test_out_of_range_expiry_is_not_permanent() {
        let claims = AccessClaims {
            user_id: "abcd".to_string(),
            expire_at: u64::MAX,
            nonce: "n".to_string(),
        };
        assert!(!claims.is_permanent());
        assert_eq!(claims.expires_at(), Some(DateTime::<Utc>::MAX_UTC));
    }
}
