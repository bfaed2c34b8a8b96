//! 게이트웨이 도메인 타입.
//!
//! 여러 크레이트가 공유하는 가입 대기 레코드와 토큰 발급용 신원 정보.

use serde::{Deserialize, Serialize};

/// 신규 가입자에게 부여되는 기본 역할.
pub const DEFAULT_USER_ROLE: &str = "user";

/// 이메일 인증을 기다리는 가입 요청.
///
/// 이메일을 키로 TTL과 함께 저장되며, accept-code 단계에서 소비됩니다.
/// 같은 이메일로 다시 제출하면 이전 레코드(코드 포함)를 덮어씁니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub username: String,
    pub country: String,
    pub bio: String,
    pub password: String,
    /// 이메일로 발송된 인증 코드
    pub code: String,
}

impl PendingRegistration {
    /// 제출된 코드가 발송된 코드와 일치하는지 확인합니다.
    ///
    /// 빈 코드는 항상 불일치로 처리합니다.
    pub fn code_matches(&self, submitted: &str) -> bool {
        !self.code.is_empty() && self.code == submitted
    }
}

/// 토큰 발급에 필요한 사용자 신원 정보.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub role: String,
    pub country: String,
}

impl Identity {
    /// 기본 `user` 역할의 신원 정보를 생성합니다.
    pub fn user(
        user_id: impl Into<String>,
        email: impl Into<String>,
        username: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            username: username.into(),
            role: DEFAULT_USER_ROLE.to_string(),
            country: country.into(),
        }
    }

    /// 역할을 교체합니다.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }
}
