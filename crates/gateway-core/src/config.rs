//! 설정 관리.
//!
//! 게이트웨이 설정을 정의하고 파일/환경 변수에서 로드합니다.
//!
//! 우선순위 (낮음 → 높음):
//! 1. 코드 기본값
//! 2. `config/default.toml` (또는 `GATEWAY_CONFIG` 경로)
//! 3. `GATEWAY__` 접두사 환경 변수 (예: `GATEWAY__JWT__ACCESS_SECRET`)

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 설정 파일 경로를 지정하는 환경 변수.
pub const CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG";

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP 서버 설정
    pub server: ServerConfig,
    /// JWT 서명 설정
    pub jwt: JwtConfig,
    /// 접근 정책 파일
    pub policy: PolicyConfig,
    /// Redis 연결 설정
    pub redis: RedisSettings,
    /// 가입/재설정 코드 캐시 TTL
    pub cache: CacheConfig,
    /// 인증 흐름 설정
    pub auth: AuthConfig,
    /// 백엔드 gRPC 서비스 주소
    pub backends: BackendConfig,
    /// 오브젝트 스토리지 설정
    pub storage: StorageConfig,
    /// 이메일 발송 설정
    pub email: EmailConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 전역 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 허용할 CORS origin 목록 (비어 있으면 모든 origin 허용)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8087,
            request_timeout_secs: 30,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// JWT 설정.
///
/// Access/Refresh 토큰은 서로 다른 비밀 키로 서명됩니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Access Token 서명 키
    pub access_secret: String,
    /// Refresh Token 서명 키
    pub refresh_secret: String,
    /// Access Token 수명 (분)
    pub access_ttl_minutes: i64,
    /// Refresh Token 수명 (일)
    pub refresh_ttl_days: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            access_ttl_minutes: 60,
            refresh_ttl_days: 7,
        }
    }
}

/// 접근 정책 파일 경로.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// 모델 파일 (matcher 정의)
    pub model_path: String,
    /// 정책 CSV 파일
    pub policy_path: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            model_path: "config/model.conf".to_string(),
            policy_path: "config/policy.csv".to_string(),
        }
    }
}

/// Redis 연결 설정.
///
/// URL이 없으면 프로세스 내 메모리 저장소를 사용합니다.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisSettings {
    /// Redis URL (redis://host:port/db)
    pub url: Option<String>,
}

/// 캐시 TTL 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 가입 대기 레코드 TTL (초)
    pub registration_ttl_secs: u64,
    /// 비밀번호 재설정 코드 TTL (초)
    pub reset_code_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            registration_ttl_secs: 600,
            reset_code_ttl_secs: 600,
        }
    }
}

/// 인증 흐름 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 관리자 계정 등록에 사용할 비밀번호
    pub admin_password: String,
    /// accept-code 단계에서 캐시 조회 제한 시간 (초)
    pub accept_code_timeout_secs: u64,
    /// 비밀번호 재설정 성공 후 코드 삭제 여부
    pub invalidate_reset_code: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_password: String::new(),
            accept_code_timeout_secs: 10,
            invalidate_reset_code: false,
        }
    }
}

/// 백엔드 gRPC 서비스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// 사용자/인증 서비스 주소
    pub identity_url: String,
    /// 게시물/댓글/좋아요 서비스 주소
    pub feed_url: String,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 연결 타임아웃 (초)
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            identity_url: "http://127.0.0.1:8085".to_string(),
            feed_url: "http://127.0.0.1:8086".to_string(),
            request_timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}

/// S3 호환 오브젝트 스토리지 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 엔드포인트 (예: http://127.0.0.1:9000)
    pub endpoint: String,
    /// 서명 리전
    pub region: String,
    /// 액세스 키
    pub access_key: String,
    /// 시크릿 키
    pub secret_key: String,
    /// 프로필 이미지 버킷
    pub profile_bucket: String,
    /// 게시물 이미지 버킷
    pub post_bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:9000".to_string(),
            region: "us-east-1".to_string(),
            access_key: String::new(),
            secret_key: String::new(),
            profile_bucket: "profile-image".to_string(),
            post_bucket: "post-image".to_string(),
        }
    }
}

/// 이메일 발송 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmailConfig {
    /// 비활성화 시 코드를 로그로만 남깁니다 (개발용)
    pub enabled: bool,
    /// 트랜잭션 메일 API URL
    pub api_url: String,
    /// API 키
    pub api_key: String,
    /// 발신자 주소
    pub sender_email: String,
    /// 발신자 이름
    pub sender_name: String,
    /// 메일 제목
    pub subject: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://api.brevo.com/v3/smtp/email".to_string(),
            api_key: String::new(),
            sender_email: String::new(),
            sender_name: "Travel Gateway".to_string(),
            subject: "Your verification code".to_string(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없어도 에러가 아닙니다. 기본값과 환경 변수만으로 구성할 수 있습니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8087)?
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("GATEWAY")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// `GATEWAY_CONFIG` 또는 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    /// 서버를 띄울 수 없는 설정을 거부합니다.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.jwt.access_secret.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "jwt.access_secret must be set".to_string(),
            ));
        }
        if self.jwt.refresh_secret.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "jwt.refresh_secret must be set".to_string(),
            ));
        }
        if self.jwt.access_ttl_minutes <= 0 || self.jwt.refresh_ttl_days <= 0 {
            return Err(config::ConfigError::Message(
                "jwt token lifetimes must be positive".to_string(),
            ));
        }
        if self.cache.registration_ttl_secs == 0 || self.cache.reset_code_ttl_secs == 0 {
            return Err(config::ConfigError::Message(
                "cache TTLs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
