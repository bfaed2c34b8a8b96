//! 저장소 백엔드.

pub mod redis;
