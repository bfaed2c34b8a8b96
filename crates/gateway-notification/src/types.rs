//! 인증 코드 전송 trait 및 에러 정의.

use async_trait::async_trait;
use rand::Rng;

/// 인증 코드 자릿수.
pub const CODE_LENGTH: usize = 6;

/// 알림 작업용 Result 타입.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 알림 에러.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("email delivery failed: {0}")]
    SendFailed(String),

    #[error("invalid email configuration: {0}")]
    InvalidConfig(String),

    #[error("rate limited, retry after {0}s")]
    RateLimited(u64),

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 인증 코드 전송기.
///
/// 구현체는 코드를 생성해 수신자에게 전달하고, 전달한 코드를 반환합니다.
/// 반환값은 호출 측이 저장해 두었다가 사용자가 제출한 코드와 비교하는 데 씁니다.
#[async_trait]
pub trait CodeSender: Send + Sync {
    /// 코드를 생성해 `email`로 전송합니다.
    async fn send_code(&self, email: &str) -> NotificationResult<String>;

    /// 전송기 이름을 반환합니다.
    fn name(&self) -> &str;
}

/// 숫자로만 이루어진 인증 코드를 생성합니다.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_shape() {
        for _ in 0..100 {
            let code = generate_code(CODE_LENGTH);
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_code_varies() {
        let codes: std::collections::HashSet<String> =
            (0..50).map(|_| generate_code(CODE_LENGTH)).collect();
        assert!(codes.len() > 1);
    }
}
