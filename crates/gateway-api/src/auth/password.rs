//! 관리자 비밀번호 해싱.
//!
//! `register-admin`은 설정된 관리자 비밀번호를 평문 대신 Argon2id PHC 해시로
//! 백엔드에 전달합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password is empty")]
    Empty,
    #[error("failed to hash password: {0}")]
    HashingFailed(String),
    #[error("password does not match")]
    Mismatch,
    #[error("invalid password hash format")]
    InvalidHashFormat,
}

/// 비밀번호를 해싱해 PHC 문자열(`$argon2id$v=19$...`)로 반환합니다.
///
/// 솔트는 호출마다 새로 생성됩니다.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
}

/// PHC 해시와 평문을 비교합니다.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| PasswordError::Mismatch)
}
