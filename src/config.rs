//! Token 有效期配置
//!
//! 可以在代码中构建，也可以从环境变量加载：
//!
//! - `DUALTOKEN_ACCESS_TTL_SECS` - Access Token 有效期（秒，0 表示永久有效）
//! - `DUALTOKEN_REFRESH_TTL_SECS` - Refresh Token 有效期（秒，0 表示永久有效）
//!
//! ```rust
//! use chrono::Duration;
//! use dualtoken::TokenConfig;
//!
//! let config = TokenConfig::new()
//!     .with_access_ttl(Duration::minutes(5))
//!     .with_refresh_ttl(Duration::days(1));
//! assert!(config.validate().is_ok());
//! ```

use chrono::Duration;
use std::env;

use crate::error::{ConfigError, Result};

/// Access Token 有效期环境变量
pub const ACCESS_TTL_ENV: &str = "DUALTOKEN_ACCESS_TTL_SECS";
/// Refresh Token 有效期环境变量
pub const REFRESH_TTL_ENV: &str = "DUALTOKEN_REFRESH_TTL_SECS";

/// 双 Token 有效期配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenConfig {
    /// Access Token 有效期（零表示永久有效）
    pub access_ttl: Duration,
    /// Refresh Token 有效期（零表示永久有效）
    pub refresh_ttl: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
        }
    }
}

impl TokenConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 两个 token 均永久有效
    pub fn permanent() -> Self {
        Self {
            access_ttl: Duration::zero(),
            refresh_ttl: Duration::zero(),
        }
    }

    /// 设置 Access Token 有效期
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// 设置 Refresh Token 有效期
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    /// 从环境变量加载，未设置的项使用默认值
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            access_ttl: ttl_from_env(ACCESS_TTL_ENV)?.unwrap_or(defaults.access_ttl),
            refresh_ttl: ttl_from_env(REFRESH_TTL_ENV)?.unwrap_or(defaults.refresh_ttl),
        };
        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.access_ttl < Duration::zero() {
            return Err(ConfigError::InvalidValue {
                key: "access_ttl".to_string(),
                message: "must not be negative".to_string(),
            }
            .into());
        }
        if self.refresh_ttl < Duration::zero() {
            return Err(ConfigError::InvalidValue {
                key: "refresh_ttl".to_string(),
                message: "must not be negative".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn ttl_from_env(key: &str) -> Result<Option<Duration>> {
    let raw = match env::var(key) {
        Ok(raw) => raw,
        Err(_) => return Ok(None),
    };
    let secs: i64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected whole seconds, got '{}'", raw),
    })?;
    Ok(Some(Duration::seconds(secs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_config() {
        let config = TokenConfig::default();
        assert_eq!(config.access_ttl, Duration::minutes(15));
        assert_eq!(config.refresh_ttl, Duration::days(7));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_permanent_config() {
        let config = TokenConfig::permanent();
        assert!(config.access_ttl.is_zero());
        assert!(config.refresh_ttl.is_zero());
    }

    #[test]
    fn test_negative_ttl_rejected() {
        let config = TokenConfig::new().with_access_ttl(Duration::seconds(-1));
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    // 只在这一个测试里读写这两个环境变量，避免并行测试互相干扰
    #[test]
    fn test_from_env() {
        unsafe {
            env::set_var(ACCESS_TTL_ENV, "60");
            env::remove_var(REFRESH_TTL_ENV);
        }
        let config = TokenConfig::from_env().unwrap();
        assert_eq!(config.access_ttl, Duration::seconds(60));
        assert_eq!(config.refresh_ttl, Duration::days(7));

        unsafe {
            env::set_var(ACCESS_TTL_ENV, "soon");
        }
        let err = TokenConfig::from_env().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { ref key, .. }) if key == ACCESS_TTL_ENV
        ));

        unsafe {
            env::remove_var(ACCESS_TTL_ENV);
        }
    }
}
