//! HTTP API 게이트웨이.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (사용자, 관리자, 게시글, 댓글, 좋아요)
//! - JWT 발급/해석과 역할 기반 접근 제어
//! - 이메일 인증 코드를 사용하는 가입 및 비밀번호 재설정 흐름
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 토큰 코덱, 정책 평가기, 권한 미들웨어
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use crate::auth::{
    hash_password, permission_middleware, verify_password, AccessClaims, JwtError,
    PolicyEnforcer, PolicyError, TokenCodec, TokenPair,
};
pub use crate::error::{ApiErrorResponse, ApiResult};
pub use crate::metrics::setup_metrics_recorder;
pub use crate::middleware::metrics_layer;
pub use crate::routes::*;
pub use crate::state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use crate::state::create_test_state;
