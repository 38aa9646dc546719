//! 统一错误类型模块
//!
//! 提供 dualtoken 库中所有操作的错误类型定义。
//!
//! Token 相关的失败统一归入 [`TokenError`]，调用方可以据此区分
//! "需要刷新"（[`TokenError::Expired`]）和"伪造或损坏"（其它变体）。

use std::fmt;

/// dualtoken 库的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// dualtoken 库的错误类型
#[derive(Debug)]
pub enum Error {
    /// Token 相关错误
    Token(TokenError),

    /// 配置错误
    Config(ConfigError),

    /// 加密错误
    Crypto(CryptoError),

    /// 序列化 / 反序列化错误
    Serialization(String),

    /// 内部错误
    Internal(String),
}

impl Error {
    /// 创建一个内部错误
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// 创建一个密钥无效错误
    pub fn invalid_secret(msg: impl Into<String>) -> Self {
        Error::Token(TokenError::InvalidSecret(msg.into()))
    }

    /// 创建一个 token 格式错误
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::Token(TokenError::MalformedToken(msg.into()))
    }

    /// 如果是 token 错误，返回其具体类型
    pub fn token_error(&self) -> Option<&TokenError> {
        match self {
            Error::Token(e) => Some(e),
            _ => None,
        }
    }

    /// 是否为 token 过期错误
    ///
    /// 访问令牌过期时调用方通常应尝试刷新；刷新令牌过期则需要重新登录。
    pub fn is_expired(&self) -> bool {
        matches!(self, Error::Token(TokenError::Expired))
    }
}

/// Token 相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// 密钥提供者缺失或返回了不可用的密钥
    InvalidSecret(String),
    /// Token 无法解析为 header/payload/signature，或 claims 无法解码
    MalformedToken(String),
    /// Header 声明的签名算法不是 HS256
    UnexpectedAlgorithm(String),
    /// Token 签名无效
    InvalidSignature,
    /// Token 已过期
    Expired,
    /// Refresh Token 绑定的 Access Token 与当前 Access Token 不一致
    BindingMismatch,
}

impl TokenError {
    /// 错误类型的稳定名称，用于日志字段
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::InvalidSecret(_) => "invalid_secret",
            TokenError::MalformedToken(_) => "malformed_token",
            TokenError::UnexpectedAlgorithm(_) => "unexpected_algorithm",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired => "expired",
            TokenError::BindingMismatch => "binding_mismatch",
        }
    }
}

/// 配置相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 缺少必需的配置
    MissingRequired(String),
    /// 无效的配置值
    InvalidValue { key: String, message: String },
}

/// 加密相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// 随机数生成失败
    RngFailed(String),
}

// ============================================================================
// Display 实现
// ============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Token(e) => write!(f, "Token error: {}", e),
            Error::Config(e) => write!(f, "Config error: {}", e),
            Error::Crypto(e) => write!(f, "Crypto error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::InvalidSecret(msg) => write!(f, "invalid secret: {}", msg),
            TokenError::MalformedToken(msg) => write!(f, "malformed token: {}", msg),
            TokenError::UnexpectedAlgorithm(alg) => {
                write!(f, "unexpected signing algorithm: {}", alg)
            }
            TokenError::InvalidSignature => write!(f, "invalid token signature"),
            TokenError::Expired => write!(f, "token has expired"),
            TokenError::BindingMismatch => {
                write!(f, "refresh token is not bound to the current access token")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(key) => {
                write!(f, "missing required configuration: {}", key)
            }
            ConfigError::InvalidValue { key, message } => {
                write!(f, "invalid configuration value for '{}': {}", key, message)
            }
        }
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::RngFailed(msg) => write!(f, "random number generation failed: {}", msg),
        }
    }
}

// ============================================================================
// std::error::Error 实现
// ============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Token(e) => Some(e),
            Error::Config(e) => Some(e),
            Error::Crypto(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for TokenError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for CryptoError {}

// ============================================================================
// From 实现 - 方便错误转换
// ============================================================================

impl From<TokenError> for Error {
    fn from(err: TokenError) -> Self {
        Error::Token(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<CryptoError> for Error {
    fn from(err: CryptoError) -> Self {
        Error::Crypto(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_error_display() {
        let err = TokenError::Expired;
        assert_eq!(err.to_string(), "token has expired");

        let err = TokenError::UnexpectedAlgorithm("none".to_string());
        assert_eq!(err.to_string(), "unexpected signing algorithm: none");
    }

    #[test]
    fn test_error_display() {
        let err = Error::Token(TokenError::InvalidSignature);
        assert_eq!(err.to_string(), "Token error: invalid token signature");
    }

    #[test]
    fn test_error_from_token_error() {
        let err: Error = TokenError::BindingMismatch.into();
        assert!(matches!(err, Error::Token(TokenError::BindingMismatch)));
        assert_eq!(err.token_error(), Some(&TokenError::BindingMismatch));
    }

    #[test]
    fn test_is_expired() {
        assert!(Error::Token(TokenError::Expired).is_expired());
        assert!(!Error::Token(TokenError::InvalidSignature).is_expired());
        assert!(!Error::internal("boom").is_expired());
    }

    #[test]
    fn test_error_source() {
        use std::error::Error as _;

        let err = Error::malformed("bad segment");
        assert!(err.source().is_some());
        assert!(Error::internal("x").source().is_none());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "DUALTOKEN_ACCESS_TTL_SECS".to_string(),
            message: "not a number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid configuration value for 'DUALTOKEN_ACCESS_TTL_SECS': not a number"
        );
    }

    #[test]
    fn test_token_error_kind() {
        assert_eq!(TokenError::Expired.kind(), "expired");
        assert_eq!(
            TokenError::InvalidSecret(String::new()).kind(),
            "invalid_secret"
        );
    }
}
