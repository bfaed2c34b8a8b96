//! 백엔드 호출 에러 타입.
//!
//! gRPC `Status`를 게이트웨이가 이해하는 분류로 옮기고,
//! 분류마다 고정된 HTTP 상태 코드를 부여합니다.

use thiserror::Error;

/// 백엔드(gRPC) 호출 에러.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// 대상 리소스 없음
    #[error("{0}")]
    NotFound(String),

    /// 잘못된 요청 인자
    #[error("{0}")]
    InvalidArgument(String),

    /// 백엔드가 자격 증명을 거부함
    #[error("{0}")]
    Unauthenticated(String),

    /// 백엔드가 권한을 거부함
    #[error("{0}")]
    PermissionDenied(String),

    /// 이미 존재하는 리소스
    #[error("{0}")]
    AlreadyExists(String),

    /// 백엔드 연결 불가 또는 타임아웃
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// 잘못된 엔드포인트 설정
    #[error("invalid backend endpoint: {0}")]
    InvalidEndpoint(String),

    /// 그 외 백엔드 에러
    #[error("{0}")]
    Internal(String),
}

/// 백엔드 호출 Result 타입.
pub type BackendResult<T> = Result<T, BackendError>;

impl BackendError {
    /// 이 에러에 대응하는 HTTP 상태 코드.
    ///
    /// NotFound→404, InvalidArgument→400, Unauthenticated→401,
    /// PermissionDenied→403, AlreadyExists→409, 나머지→500.
    pub fn http_status(&self) -> u16 {
        match self {
            BackendError::NotFound(_) => 404,
            BackendError::InvalidArgument(_) => 400,
            BackendError::Unauthenticated(_) => 401,
            BackendError::PermissionDenied(_) => 403,
            BackendError::AlreadyExists(_) => 409,
            BackendError::Unavailable(_)
            | BackendError::InvalidEndpoint(_)
            | BackendError::Internal(_) => 500,
        }
    }

    /// 재시도 가능한 에러인지 확인합니다.
    ///
    /// 게이트웨이 핸들러는 재시도하지 않지만 로그 분류에 사용합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Unavailable(_))
    }
}

impl From<tonic::Status> for BackendError {
    fn from(status: tonic::Status) -> Self {
        let message = status.message().to_string();
        match status.code() {
            tonic::Code::NotFound => BackendError::NotFound(message),
            tonic::Code::InvalidArgument | tonic::Code::OutOfRange => {
                BackendError::InvalidArgument(message)
            }
            tonic::Code::Unauthenticated => BackendError::Unauthenticated(message),
            tonic::Code::PermissionDenied => BackendError::PermissionDenied(message),
            tonic::Code::AlreadyExists => BackendError::AlreadyExists(message),
            tonic::Code::Unavailable | tonic::Code::DeadlineExceeded => {
                BackendError::Unavailable(message)
            }
            _ => BackendError::Internal(message),
        }
    }
}

impl From<tonic::transport::Error> for BackendError {
    fn from(err: tonic::transport::Error) -> Self {
        BackendError::InvalidEndpoint(err.to_string())
    }
}

/// 오브젝트 스토리지 에러.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage configuration: {0}")]
    InvalidConfig(String),

    #[error("request signing failed: {0}")]
    Signing(String),

    #[error("upload rejected (status={status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// 스토리지 Result 타입.
pub type StorageResult<T> = Result<T, StorageError>;
