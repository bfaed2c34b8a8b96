//! 가입 흐름용 단기 저장소.
//!
//! 이 crate는 다음을 제공합니다:
//! - Redis 연결 래퍼 ([`RedisCache`])
//! - 가입 대기 레코드/재설정 코드 저장소 trait ([`RegistrationStore`])와 Redis/메모리 구현

pub mod error;
pub mod registration;
pub mod storage;

pub use error::{DataError, Result};
pub use registration::{
    connect_registration_store, registration_key, reset_code_key, MemoryRegistrationStore,
    RedisRegistrationStore, RegistrationBackend, RegistrationStore,
};
pub use storage::redis::{RedisCache, RedisConfig};
