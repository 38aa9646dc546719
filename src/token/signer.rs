//! 紧凑 JWT 的签名与校验
//!
//! 只支持 HS256 一种算法。校验时先读取 header 中声明的算法，
//! 不是 HS256 的一律以 [`TokenError::UnexpectedAlgorithm`] 拒绝，
//! 这一步发生在取密钥和计算 HMAC 之前，用于抵御算法混淆攻击
//! （`none`、把公钥当作 HMAC 密钥等）。
//!
//! ```rust
//! use dualtoken::token::claims::AccessClaims;
//! use dualtoken::token::secret::StaticSecret;
//! use dualtoken::token::signer;
//! use chrono::Duration;
//!
//! let secret = StaticSecret::new(b"my-secret-key-at-least-32-bytes!".to_vec());
//! let claims = AccessClaims::new("user123", Duration::hours(1)).unwrap();
//!
//! let token = signer::sign(&claims, &secret).unwrap();
//! let verified: AccessClaims = signer::verify(&token, &secret).unwrap();
//! assert_eq!(verified.user_id, "user123");
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, dangerous::insecure_decode,
    decode, encode,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{Error, Result, TokenError};
use crate::token::claims::ExpiringClaims;
use crate::token::secret::{SecretProvider, fetch_key};

/// 唯一信任的签名算法
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// header 中 [`ALGORITHM`] 的名称
pub const ALGORITHM_NAME: &str = "HS256";

/// 只读取算法字段的 header
#[derive(Debug, Deserialize)]
struct RawHeader {
    alg: String,
}

/// 签名 claims，返回紧凑 JWT 字符串
///
/// 提供者返回空密钥或签名失败时返回 [`TokenError::InvalidSecret`]。
pub fn sign<C: Serialize>(claims: &C, provider: &dyn SecretProvider) -> Result<String> {
    let key = fetch_key(provider)?;
    let header = Header::new(ALGORITHM);

    encode(&header, claims, &EncodingKey::from_secret(&key)).map_err(|e| {
        Error::Token(TokenError::InvalidSecret(format!(
            "failed to sign token: {}",
            e
        )))
    })
}

/// 以当前时间校验 token
pub fn verify<C>(token: &str, provider: &dyn SecretProvider) -> Result<C>
where
    C: DeserializeOwned + ExpiringClaims,
{
    verify_at(token, provider, Utc::now())
}

/// 以指定时间校验 token
///
/// 依次检查：结构、算法、签名、过期时间。
pub fn verify_at<C>(token: &str, provider: &dyn SecretProvider, now: DateTime<Utc>) -> Result<C>
where
    C: DeserializeOwned + ExpiringClaims,
{
    let alg = peek_algorithm(token)?;
    if alg != ALGORITHM_NAME {
        tracing::trace!(alg = %alg, "rejected token with unexpected algorithm");
        return Err(TokenError::UnexpectedAlgorithm(alg).into());
    }

    let key = fetch_key(provider)?;
    let token_data: TokenData<C> =
        decode(token, &DecodingKey::from_secret(&key), &build_validation()).map_err(map_jwt_error)?;

    token_data.claims.validate_at(now)?;
    Ok(token_data.claims)
}

/// 不校验签名和过期时间，仅解码 claims
///
/// # 警告
///
/// 返回的数据未经认证。只用于解码已被外层签名保护的内层 token。
pub fn decode_unverified<C: DeserializeOwned>(token: &str) -> Result<C> {
    split_segments(token)?;
    let token_data: TokenData<C> = insecure_decode(token)
        .map_err(|e| Error::malformed(format!("failed to decode token: {}", e)))?;

    Ok(token_data.claims)
}

/// 读取 header 中声明的算法名，不做任何密码学校验
pub fn peek_algorithm(token: &str) -> Result<String> {
    let [header, _, _] = split_segments(token)?;
    let raw = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|e| Error::malformed(format!("invalid header encoding: {}", e)))?;
    let header: RawHeader = serde_json::from_slice(&raw)
        .map_err(|e| Error::malformed(format!("invalid header: {}", e)))?;

    Ok(header.alg)
}

/// 切分为 header / payload / signature 三段
fn split_segments(token: &str) -> Result<[&str; 3]> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None)
            if !header.is_empty() && !payload.is_empty() && !signature.is_empty() =>
        {
            Ok([header, payload, signature])
        }
        _ => Err(Error::malformed("expected three non-empty segments")),
    }
}

fn build_validation() -> Validation {
    let mut validation = Validation::new(ALGORITHM);
    // 过期由 ExpiringClaims 判断：exp == 0 表示永久有效
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> Error {
    use jsonwebtoken::errors::ErrorKind;

    let error = match e.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm => TokenError::UnexpectedAlgorithm(e.to_string()),
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::MalformedToken(e.to_string()),
    };
    Error::Token(error)
}
