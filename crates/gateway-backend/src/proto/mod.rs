//! 백엔드 gRPC 메시지 정의.
//!
//! 백엔드 서비스의 `.proto`와 필드 번호가 일치해야 합니다.

pub mod post;
pub mod user;
