//! 이메일 기반 인증 코드 전송기.
//!
//! 트랜잭션 메일 HTTP API(Brevo 호환 JSON 본문, `api-key` 헤더)로 코드를 발송합니다.

use async_trait::async_trait;
use gateway_core::EmailConfig;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::types::{generate_code, CodeSender, NotificationError, NotificationResult, CODE_LENGTH};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody {
    sender: EmailAddress,
    to: Vec<EmailAddress>,
    subject: String,
    html_content: String,
    text_content: String,
}

/// HTTP 메일 API 전송기.
pub struct EmailCodeSender {
    client: Client,
    api_url: String,
    api_key: SecretString,
    sender_email: String,
    sender_name: String,
    subject: String,
}

impl EmailCodeSender {
    /// 설정에서 전송기를 생성합니다.
    ///
    /// API 키나 발신자 주소가 비어 있으면 `InvalidConfig`.
    pub fn from_config(config: &EmailConfig) -> NotificationResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(NotificationError::InvalidConfig(
                "email.api_key is required".to_string(),
            ));
        }
        if config.sender_email.trim().is_empty() {
            return Err(NotificationError::InvalidConfig(
                "email.sender_email is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: SecretString::from(config.api_key.clone()),
            sender_email: config.sender_email.clone(),
            sender_name: config.sender_name.clone(),
            subject: config.subject.clone(),
        })
    }

    fn build_body(&self, to_email: &str, code: &str) -> SendEmailBody {
        SendEmailBody {
            sender: EmailAddress {
                email: self.sender_email.clone(),
                name: Some(self.sender_name.clone()).filter(|n| !n.is_empty()),
            },
            to: vec![EmailAddress {
                email: to_email.to_string(),
                name: None,
            }],
            subject: self.subject.clone(),
            html_content: format!(
                "<p>Your verification code is <strong>{}</strong>.</p>",
                code
            ),
            text_content: format!("Your verification code is {}", code),
        }
    }

    /// 코드를 담은 메일 한 통을 보냅니다.
    async fn deliver(&self, to_email: &str, code: &str) -> NotificationResult<()> {
        let body = self.build_body(to_email, code);

        let response = self
            .client
            .post(&self.api_url)
            .header("api-key", self.api_key.expose_secret())
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %to_email, %status, "Verification email accepted");
            return Ok(());
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            return Err(NotificationError::RateLimited(retry_after));
        }

        let text = response.text().await.unwrap_or_default();
        warn!(to = %to_email, %status, "Verification email rejected");
        Err(NotificationError::SendFailed(format!(
            "status={}: {}",
            status.as_u16(),
            text
        )))
    }
}

#[async_trait]
impl CodeSender for EmailCodeSender {
    async fn send_code(&self, email: &str) -> NotificationResult<String> {
        let code = generate_code(CODE_LENGTH);
        self.deliver(email, &code).await?;
        Ok(code)
    }

    fn name(&self) -> &str {
        "email"
    }
}

/// 메일을 보내지 않고 코드를 로그로 남기는 전송기 (개발용).
#[derive(Debug, Default)]
pub struct LogCodeSender;

#[async_trait]
impl CodeSender for LogCodeSender {
    async fn send_code(&self, email: &str) -> NotificationResult<String> {
        let code = generate_code(CODE_LENGTH);
        info!(to = %email, code = %code, "Email delivery disabled, verification code logged");
        Ok(code)
    }

    fn name(&self) -> &str {
        "log"
    }
}
