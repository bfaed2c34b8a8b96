//! # Gateway Core
//!
//! 게이트웨이 전반에서 사용하는 공통 요소를 제공합니다:
//! - 설정 관리 (`config` 크레이트, 파일 + 환경 변수)
//! - 로깅 인프라 (`tracing`)
//! - 가입 대기 레코드, 토큰 발급용 신원 정보

pub mod config;
pub mod domain;
pub mod logging;

pub use self::config::*;
pub use domain::*;
pub use logging::*;
