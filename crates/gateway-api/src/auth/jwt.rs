//! JWT 토큰 처리.
//!
//! Access Token 및 Refresh Token 생성/검증 로직.
//! Access/Refresh 토큰은 서로 다른 비밀 키로 서명됩니다 (HS256).

use chrono::{Duration, Utc};
use gateway_core::{Identity, JwtConfig};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// JWT Access Token 페이로드.
///
/// 역할이 없는 토큰도 디코딩되며, 이 경우 `role`은 빈 문자열입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// 사용자 ID
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    /// RBAC 역할 (`user`, `admin`, ...)
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub country: String,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// JWT ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl AccessClaims {
    /// 신원 정보로 Claims를 생성합니다.
    ///
    /// # Arguments
    ///
    /// * `identity` - 토큰에 담을 사용자 정보
    /// * `ttl` - 유효 기간
    pub fn new(identity: &Identity, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            email: identity.email.clone(),
            role: identity.role.clone(),
            country: identity.country.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Some(uuid::Uuid::new_v4().to_string()),
        }
    }
}

/// Refresh Token 페이로드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject - 사용자 ID
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    /// 항상 "refresh"
    pub token_type: String,
}

impl RefreshClaims {
    /// 새로운 Refresh Claims 생성.
    pub fn new(user_id: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: "refresh".to_string(),
        }
    }
}

/// Access Token + Refresh Token 페어.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access Token 만료 시간 (초)
    pub expires_in: i64,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
}

/// JWT 처리 에러.
///
/// 메시지는 401 응답 본문에 그대로 노출됩니다.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("failed to sign token: {0}")]
    Signing(String),
    #[error("failed to decode token: {0}")]
    Decoding(String),
    #[error("token is malformed or has an invalid signature")]
    InvalidToken,
    #[error("token has expired")]
    TokenExpired,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::Base64(_) => JwtError::InvalidToken,
            _ => JwtError::Decoding(e.to_string()),
        }
    }
}

/// `Authorization` 헤더 값에서 토큰 부분만 꺼냅니다.
///
/// `Bearer ` 접두사는 있으면 제거하고, 없으면 값 전체를 토큰으로 봅니다.
pub fn strip_bearer(header_value: &str) -> &str {
    let value = header_value.trim();
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .unwrap_or(value)
}

/// 토큰 발급/검증기.
///
/// 비밀 키와 유효 기간은 시작 시 한 번 설정되고 이후 변경되지 않습니다.
pub struct TokenCodec {
    access_secret: SecretString,
    refresh_secret: SecretString,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// # Arguments
    ///
    /// * `access_secret` - Access Token 서명 키
    /// * `refresh_secret` - Refresh Token 서명 키
    /// * `access_ttl_minutes` - Access Token 만료 시간 (분)
    /// * `refresh_ttl_days` - Refresh Token 만료 시간 (일)
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        access_ttl_minutes: i64,
        refresh_ttl_days: i64,
    ) -> Self {
        Self {
            access_secret: SecretString::from(access_secret.into()),
            refresh_secret: SecretString::from(refresh_secret.into()),
            access_ttl: Duration::minutes(access_ttl_minutes),
            refresh_ttl: Duration::days(refresh_ttl_days),
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(
            config.access_secret.clone(),
            config.refresh_secret.clone(),
            config.access_ttl_minutes,
            config.refresh_ttl_days,
        )
    }

    /// Access Token 유효 기간 (초).
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Access Token 발급.
    pub fn issue_access_token(&self, identity: &Identity) -> Result<String, JwtError> {
        let claims = AccessClaims::new(identity, self.access_ttl);
        sign(&claims, &self.access_secret)
    }

    /// Refresh Token 발급.
    pub fn issue_refresh_token(&self, user_id: &str) -> Result<String, JwtError> {
        let claims = RefreshClaims::new(user_id, self.refresh_ttl);
        sign(&claims, &self.refresh_secret)
    }

    /// Access Token + Refresh Token 쌍 발급.
    pub fn issue_token_pair(&self, identity: &Identity) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(identity)?,
            refresh_token: self.issue_refresh_token(&identity.user_id)?,
            expires_in: self.access_ttl_secs(),
            token_type: "Bearer".to_string(),
        })
    }

    /// 서명을 검증하고 Claims를 꺼냅니다.
    ///
    /// 만료는 여기서 검사하지 않습니다. 호출자가 [`TokenCodec::validate_token`]으로
    /// 별도 단계에서 판단합니다.
    pub fn extract_claims(&self, header_value: &str) -> Result<AccessClaims, JwtError> {
        let token = strip_bearer(header_value);
        if token.is_empty() {
            return Err(JwtError::InvalidToken);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.access_secret.expose_secret().as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }

    /// 서명과 만료가 모두 유효하면 `true`.
    ///
    /// 만료된 토큰은 에러가 아니라 `Ok(false)`입니다.
    pub fn validate_token(&self, header_value: &str) -> Result<bool, JwtError> {
        let token = strip_bearer(header_value);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.access_secret.expose_secret().as_bytes()),
            &validation,
        ) {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn sign<T: Serialize>(claims: &T, secret: &SecretString) -> Result<String, JwtError> {
    let secret = secret.expose_secret();
    if secret.is_empty() {
        return Err(JwtError::Signing("secret is empty".to_string()));
    }

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::Signing(e.to_string()))
}
