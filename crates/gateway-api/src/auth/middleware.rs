//! 권한 확인 미들웨어.
//!
//! 보호된 라우트 그룹마다 `route_layer`로 적용됩니다. 요청당 순서:
//!
//! 1. `Authorization` 헤더에서 Claims 추출 (실패 시 401)
//! 2. `(role, 라우트 템플릿, method)`로 정책 판정 (거부 401, 판정 오류 500)
//! 3. 만료 확인 (만료 시 400)
//! 4. [`CurrentUser`], [`AuthClaims`]를 요청 extension에 저장
//!
//! 실패하면 JSON 본문 하나로 응답하고 핸들러는 실행되지 않습니다.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, MatchedPath, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

use super::jwt::AccessClaims;
use crate::error::{ApiError, ApiErrorResponse};
use crate::metrics::record_permission_denied;
use crate::state::AppState;

/// 인증된 사용자 ID 추출기.
///
/// ```rust,ignore
/// async fn get_profile(CurrentUser(user_id): CurrentUser) -> impl IntoResponse {
///     format!("user {}", user_id)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

/// 검증된 전체 Claims 추출기.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub AccessClaims);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiErrorResponse::unauthorized("unauthorized"))
    }
}

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AccessClaims>()
            .cloned()
            .map(AuthClaims)
            .ok_or_else(|| ApiErrorResponse::unauthorized("unauthorized"))
    }
}

/// 토큰 추출 → 정책 판정 → 만료 확인.
///
/// `middleware::from_fn_with_state(state, permission_middleware)`로 사용합니다.
pub async fn permission_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .trim();
    if header.is_empty() {
        return ApiErrorResponse::unauthorized("token is empty").into_response();
    }

    let claims = match state.tokens.extract_claims(header) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "Rejected request with unreadable token");
            return ApiErrorResponse::unauthorized(e.to_string()).into_response();
        }
    };
    if claims.role.is_empty() {
        return ApiErrorResponse::unauthorized("role is empty").into_response();
    }

    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().as_str().to_string();

    match state.enforcer.enforce(&claims.role, &path, &method) {
        Ok(true) => {}
        Ok(false) => {
            warn!(user_id = %claims.user_id, role = %claims.role, %path, %method, "Permission denied");
            record_permission_denied(&claims.role);
            return ApiErrorResponse::unauthorized("you don't have permission").into_response();
        }
        Err(e) => {
            error!(error = %e, role = %claims.role, %path, "Policy evaluation failed");
            return ApiErrorResponse::with_status(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                .into_response();
        }
    }

    if !state.tokens.validate_token(header).unwrap_or(false) {
        return ApiErrorResponse::bad_request("token invalid").into_response();
    }

    request
        .extensions_mut()
        .insert(CurrentUser(claims.user_id.clone()));
    request.extensions_mut().insert(claims);

    next.run(request).await
}
