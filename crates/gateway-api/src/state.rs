//! 애플리케이션 상태 관리.
//!
//! 모든 API 핸들러에서 공유되는 애플리케이션 상태를 정의합니다.
//! 토큰 발급기와 정책 테이블은 시작 시 한 번 만들어지고 이후 읽기 전용입니다.

use std::sync::Arc;

use gateway_backend::{FeedService, IdentityService, ObjectStorage};
use gateway_core::{AuthConfig, StorageConfig};
use gateway_data::{RedisCache, RegistrationStore};
use gateway_notification::CodeSender;

use crate::auth::{PolicyEnforcer, TokenCodec};

/// 업로드 대상 버킷.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buckets {
    pub profile: String,
    pub post: String,
}

impl Buckets {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            profile: config.profile_bucket.clone(),
            post: config.post_bucket.clone(),
        }
    }
}

impl Default for Buckets {
    fn default() -> Self {
        Self::from_config(&StorageConfig::default())
    }
}

/// 애플리케이션 공유 상태.
///
/// Axum 핸들러에서 `State<Arc<AppState>>`로 접근합니다.
#[derive(Clone)]
pub struct AppState {
    /// JWT 발급/검증기
    pub tokens: Arc<TokenCodec>,

    /// RBAC 정책
    pub enforcer: Arc<PolicyEnforcer>,

    /// 가입 대기/재설정 코드 저장소
    pub registrations: Arc<dyn RegistrationStore>,

    /// 인증 코드 발송기
    pub code_sender: Arc<dyn CodeSender>,

    /// 사용자 백엔드
    pub identity: Arc<dyn IdentityService>,

    /// 게시글/댓글/좋아요 백엔드
    pub feed: Arc<dyn FeedService>,

    /// 이미지 업로드 스토리지
    pub storage: Arc<dyn ObjectStorage>,

    pub buckets: Buckets,

    /// 인증 흐름 설정 (관리자 비밀번호, accept-code 타임아웃 등)
    pub auth: AuthConfig,

    /// Redis 연결 (설정된 경우, 헬스 체크용)
    pub redis: Option<RedisCache>,

    /// 서버 시작 시간
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// 애플리케이션 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// 버킷과 인증 설정은 기본값으로 시작하며 `with_*`로 교체합니다.
    pub fn new(
        tokens: TokenCodec,
        enforcer: PolicyEnforcer,
        registrations: Arc<dyn RegistrationStore>,
        code_sender: Arc<dyn CodeSender>,
        identity: Arc<dyn IdentityService>,
        feed: Arc<dyn FeedService>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            tokens: Arc::new(tokens),
            enforcer: Arc::new(enforcer),
            registrations,
            code_sender,
            identity,
            feed,
            storage,
            buckets: Buckets::default(),
            auth: AuthConfig::default(),
            redis: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_auth_settings(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_buckets(mut self, buckets: Buckets) -> Self {
        self.buckets = buckets;
        self
    }

    /// Redis 연결 설정 (헬스 체크 대상).
    pub fn with_redis(mut self, cache: RedisCache) -> Self {
        self.redis = Some(cache);
        self
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// Redis 설정 여부 확인.
    pub fn has_redis(&self) -> bool {
        self.redis.is_some()
    }

    /// Redis 연결 상태 확인.
    pub async fn is_redis_healthy(&self) -> bool {
        match &self.redis {
            Some(cache) => cache.health_check().await.unwrap_or(false),
            None => false,
        }
    }
}

/// 테스트용 AppState 생성.
///
/// 백엔드/발송기/스토리지는 모두 메모리 mock이며, 정책은
/// 저장소의 `config/model.conf`, `config/policy.csv`를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub async fn create_test_state() -> AppState {
    crate::testing::TestContext::new().await.state
}
