//! 인증 코드 전송 서비스.
//!
//! 가입 확인과 비밀번호 재설정에 쓰이는 일회용 코드를 생성하고 발송합니다.
//!
//! # 사용 예
//!
//! ```rust,ignore
//! use gateway_notification::{CodeSender, EmailCodeSender};
//!
//! let sender = EmailCodeSender::from_config(&config.email)?;
//! let code = sender.send_code("user@example.com").await?;
//! ```

pub mod email;
pub mod types;

pub use email::{EmailCodeSender, LogCodeSender};
pub use types::*;
