//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 캐시 저장소 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 연결 오류
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    /// 캐시 명령 실패
    #[error("Cache error: {0}")]
    CacheError(String),

    /// 키가 없거나 TTL이 지남
    #[error("not found or expired: {0}")]
    NotFoundOrExpired(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DataError {
    /// 키 부재/만료 오류인지 확인합니다.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::NotFoundOrExpired(_))
    }
}

impl From<redis::RedisError> for DataError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() {
            DataError::ConnectionError(err.to_string())
        } else {
            DataError::CacheError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
