//! API 에러 응답 타입.
//!
//! 모든 에러 응답 본문은 `{"error": "<message>"}` 형식입니다.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use gateway_backend::{BackendError, StorageError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// API 에러 응답 본문.
///
/// ```json
/// { "error": "you don't have permission" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
}

/// 핸들러 에러: 상태 코드 + JSON 본문.
pub type ApiError = (StatusCode, Json<ApiErrorResponse>);

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// 임의 상태 코드의 에러.
    pub fn with_status(status: StatusCode, error: impl Into<String>) -> ApiError {
        (status, Json(Self::new(error)))
    }

    /// 400 Bad Request
    pub fn bad_request(error: impl Into<String>) -> ApiError {
        Self::with_status(StatusCode::BAD_REQUEST, error)
    }

    /// 401 Unauthorized
    pub fn unauthorized(error: impl Into<String>) -> ApiError {
        Self::with_status(StatusCode::UNAUTHORIZED, error)
    }

    /// 404 Not Found
    pub fn not_found(error: impl Into<String>) -> ApiError {
        Self::with_status(StatusCode::NOT_FOUND, error)
    }

    /// 500 Internal Server Error
    pub fn internal(error: impl Into<String>) -> ApiError {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.error)
    }
}

/// 백엔드 에러를 HTTP 응답으로 변환합니다.
///
/// 상태 코드는 [`BackendError::http_status`]를 따릅니다.
pub fn backend_error(err: BackendError) -> ApiError {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(error = %err, "Backend call failed");
    } else {
        tracing::debug!(error = %err, status = %status, "Backend rejected request");
    }
    ApiErrorResponse::with_status(status, err.to_string())
}

/// 업로드 실패는 모두 500입니다.
pub fn storage_error(err: StorageError) -> ApiError {
    tracing::error!(error = %err, "Object upload failed");
    ApiErrorResponse::internal(format!("failed to upload file: {}", err))
}

// ==================== Extractors ====================

/// JSON 본문 추출기. 바인딩 실패 시 400 `{"error": ...}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| JsonBody(value))
            .map_err(|rejection| ApiErrorResponse::bad_request(rejection.body_text()))
    }
}

/// 쿼리 문자열 추출기. 바인딩 실패 시 400 `{"error": ...}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| QueryParams(value))
            .map_err(|rejection: QueryRejection| ApiErrorResponse::bad_request(rejection.body_text()))
    }
}
