//! 인증 endpoint (토큰 불필요).
//!
//! - 가입: `POST /auth/register` → 이메일로 코드 발송, `POST /auth/accept-code` → 백엔드 가입 + 토큰 발급
//! - 비밀번호 재설정: `POST /auth/forgot-password` → `POST /auth/reset-password`
//! - 로그인: `POST /auth/login/email`, `POST /auth/login/username`
//! - `POST /auth/register-admin`

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
    routing::post,
    Json, Router,
};
use gateway_backend::proto::user;
use gateway_core::{Identity, PendingRegistration, DEFAULT_USER_ROLE};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use validator::Validate;

use crate::auth::{hash_password, TokenPair};
use crate::error::{backend_error, ApiErrorResponse, ApiResult, JsonBody};
use crate::metrics::{record_registration, stage};
use crate::state::AppState;

/// 로그인 쿠키 수명 (초).
const COOKIE_MAX_AGE_SECS: u64 = 3600;

// ==================== Request/Response ====================

/// 가입 요청.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    fn into_pending(self, code: String) -> PendingRegistration {
        PendingRegistration {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            username: self.username,
            country: self.country,
            bio: self.bio,
            password: self.password,
            code,
        }
    }
}

/// 인증 코드 제출.
#[derive(Debug, Clone, Deserialize)]
pub struct AcceptCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

// ==================== Registration ====================

/// 가입 요청을 받아 인증 코드를 발송하고 대기 레코드를 저장합니다.
///
/// 같은 이메일로 다시 요청하면 이전 레코드와 코드를 덮어씁니다.
/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> ApiResult<Json<InfoResponse>> {
    if req.validate().is_err() {
        return Err(ApiErrorResponse::bad_request("invalid email provided"));
    }

    let code = state.code_sender.send_code(&req.email).await.map_err(|e| {
        warn!(email = %req.email, error = %e, "Verification code delivery failed");
        ApiErrorResponse::bad_request(format!("failed to send verification code: {}", e))
    })?;

    let email = req.email.clone();
    state
        .registrations
        .set_register(&req.into_pending(code))
        .await
        .map_err(|e| {
            error!(email = %email, error = %e, "Failed to store pending registration");
            ApiErrorResponse::internal(format!("failed to store pending registration: {}", e))
        })?;

    record_registration(stage::CODE_SENT);
    info!(email = %email, "Verification code sent");

    Ok(Json(InfoResponse {
        info: format!("code sent to this email {}", email),
    }))
}

/// 코드를 확인하고 백엔드에 가입시킨 뒤 토큰을 발급합니다.
///
/// 코드가 틀리면 대기 레코드는 그대로 남습니다.
/// POST /auth/accept-code
pub async fn accept_code(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<AcceptCodeRequest>,
) -> ApiResult<Json<user::RegisterResponse>> {
    let deadline = Duration::from_secs(state.auth.accept_code_timeout_secs);
    let pending = tokio::time::timeout(deadline, state.registrations.get_register(&req.email))
        .await
        .map_err(|_| {
            ApiErrorResponse::internal("failed to get pending registration: lookup timed out")
        })?
        .map_err(|e| {
            warn!(email = %req.email, error = %e, "Pending registration lookup failed");
            ApiErrorResponse::internal(format!("failed to get pending registration: {}", e))
        })?;

    if !pending.code_matches(&req.code) {
        record_registration(stage::CODE_MISMATCH);
        return Err(ApiErrorResponse::bad_request("invalid code"));
    }

    let mut created = state
        .identity
        .register(user::RegisterRequest {
            email: pending.email.clone(),
            phone: pending.phone.clone(),
            first_name: pending.first_name.clone(),
            last_name: pending.last_name.clone(),
            username: pending.username.clone(),
            country: pending.country.clone(),
            password: pending.password.clone(),
            bio: pending.bio.clone(),
        })
        .await
        .map_err(|e| {
            error!(email = %pending.email, error = %e, "Identity backend rejected registration");
            ApiErrorResponse::internal(format!("failed to register user: {}", e))
        })?;

    let identity = Identity::user(
        created.id.clone(),
        created.email.clone(),
        pending.username,
        pending.country,
    );
    let tokens = state.tokens.issue_token_pair(&identity).map_err(|e| {
        error!(user_id = %created.id, error = %e, "Token issuance failed after registration");
        ApiErrorResponse::internal(format!("failed to issue tokens: {}", e))
    })?;

    created.access_token = tokens.access_token;
    created.refresh_token = tokens.refresh_token;

    record_registration(stage::COMPLETED);
    info!(user_id = %created.id, email = %created.email, "User registered");

    Ok(Json(created))
}

// ==================== Password reset ====================

/// 가입된 이메일로 재설정 코드를 보냅니다.
///
/// POST /auth/forgot-password
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .identity
        .get_user_by_email(user::Email {
            email: req.email.clone(),
        })
        .await
        .map_err(|e| {
            warn!(email = %req.email, error = %e, "Password reset for unknown user");
            ApiErrorResponse::internal("user not registered")
        })?;

    let code = state.code_sender.send_code(&req.email).await.map_err(|e| {
        error!(email = %req.email, error = %e, "Reset code delivery failed");
        ApiErrorResponse::internal(format!("failed to send reset code: {}", e))
    })?;

    state
        .registrations
        .set_code(&req.email, &code)
        .await
        .map_err(|e| {
            error!(email = %req.email, error = %e, "Failed to store reset code");
            ApiErrorResponse::internal(format!("failed to store reset code: {}", e))
        })?;

    Ok(MessageResponse::new("password reset code sent to your email"))
}

/// 재설정 코드를 확인하고 비밀번호를 교체합니다.
///
/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let stored = state
        .registrations
        .get_code(&req.email)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                ApiErrorResponse::not_found("invalid or expired code")
            } else {
                error!(email = %req.email, error = %e, "Reset code lookup failed");
                ApiErrorResponse::internal(format!("failed to get reset code: {}", e))
            }
        })?;

    if stored.is_empty() || stored != req.code {
        return Err(ApiErrorResponse::unauthorized("invalid code"));
    }

    let account = state
        .identity
        .get_user_by_email(user::Email {
            email: req.email.clone(),
        })
        .await
        .map_err(|e| ApiErrorResponse::internal(format!("failed to get user: {}", e)))?;

    state
        .identity
        .update_password(user::UpdatePasswordReq {
            id: account.id.clone(),
            password: req.new_password,
        })
        .await
        .map_err(|e| {
            error!(user_id = %account.id, error = %e, "Password update failed");
            ApiErrorResponse::internal(format!("failed to update password: {}", e))
        })?;

    if state.auth.invalidate_reset_code {
        if let Err(e) = state.registrations.delete_code(&req.email).await {
            warn!(email = %req.email, error = %e, "Failed to invalidate reset code");
        }
    }

    info!(user_id = %account.id, "Password reset");
    Ok(MessageResponse::new("password reset successfully"))
}

// ==================== Login ====================

fn issue_login_tokens(state: &AppState, account: user::UserIdentity) -> ApiResult<TokenPair> {
    let role = if account.role.is_empty() {
        DEFAULT_USER_ROLE.to_string()
    } else {
        account.role
    };
    let identity = Identity::user(account.id, account.email, account.username, account.country)
        .with_role(role);

    state.tokens.issue_token_pair(&identity).map_err(|e| {
        error!(user_id = %identity.user_id, error = %e, "Token issuance failed");
        ApiErrorResponse::internal(format!("failed to issue tokens: {}", e))
    })
}

/// 이메일/비밀번호 로그인.
///
/// POST /auth/login/email
pub async fn login_email(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<user::LoginEmailRequest>,
) -> ApiResult<Json<TokenPair>> {
    let account = state.identity.login_email(req).await.map_err(backend_error)?;
    Ok(Json(issue_login_tokens(&state, account)?))
}

/// 사용자명/비밀번호 로그인. 토큰을 HttpOnly 쿠키로도 내려줍니다.
///
/// POST /auth/login/username
pub async fn login_username(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<user::LoginUsernameRequest>,
) -> ApiResult<impl IntoResponse> {
    let account = state
        .identity
        .login_username(req)
        .await
        .map_err(backend_error)?;
    let tokens = issue_login_tokens(&state, account)?;

    let cookies = AppendHeaders([
        (SET_COOKIE, auth_cookie("access_token", &tokens.access_token)),
        (SET_COOKIE, auth_cookie("refresh_token", &tokens.refresh_token)),
    ]);
    Ok((cookies, Json(tokens)))
}

fn auth_cookie(name: &str, value: &str) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly",
        name, value, COOKIE_MAX_AGE_SECS
    )
}

/// 설정된 관리자 비밀번호를 해싱해 관리자 계정을 등록합니다.
///
/// POST /auth/register-admin
pub async fn register_admin(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<MessageResponse>> {
    if state.auth.admin_password.is_empty() {
        return Err(ApiErrorResponse::internal("admin password is not configured"));
    }

    let hashed = hash_password(&state.auth.admin_password)
        .map_err(|e| ApiErrorResponse::internal(e.to_string()))?;

    state
        .identity
        .register_admin(user::Message { message: hashed })
        .await
        .map_err(backend_error)?;

    info!("Admin account registered");
    Ok(MessageResponse::new("admin registered"))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/accept-code", post(accept_code))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/login/email", post(login_email))
        .route("/login/username", post(login_username))
        .route("/register-admin", post(register_admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCodeSender, TestContext};
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use gateway_data::RegistrationStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(ctx: &TestContext) -> Router {
        Router::new()
            .nest("/auth", auth_router())
            .with_state(Arc::new(ctx.state.clone()))
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn signup(email: &str) -> Value {
        json!({
            "first_name": "Tom",
            "last_name": "Lee",
            "email": email,
            "phone": "010",
            "username": "tom0011",
            "country": "KR",
            "bio": "hi",
            "password": "pw-1234",
        })
    }

    #[tokio::test]
    async fn test_register_stores_pending_record() {
        let ctx = TestContext::with_sender(MockCodeSender::with_codes(["123456"])).await;
        let (status, body) = post_json(app(&ctx), "/auth/register", signup("a@b.com")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["info"], "code sent to this email a@b.com");

        let pending = ctx.store.get_register("a@b.com").await.unwrap();
        assert_eq!(pending.code, "123456");
        assert_eq!(pending.username, "tom0011");
    }

    #[tokio::test]
    async fn test_register_invalid_email() {
        let ctx = TestContext::new().await;
        let (status, body) = post_json(app(&ctx), "/auth/register", signup("not-an-email")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid email provided");
        assert!(ctx.sender.sent().is_empty());
        assert_eq!(ctx.store.registration_count().await, 0);
    }

    #[tokio::test]
    async fn test_register_send_failure_caches_nothing() {
        let ctx = TestContext::new().await;
        ctx.sender.fail();
        let (status, body) = post_json(app(&ctx), "/auth/register", signup("a@b.com")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("failed to send verification code"));
        assert_eq!(ctx.store.registration_count().await, 0);
    }

    #[tokio::test]
    async fn test_register_malformed_body() {
        let ctx = TestContext::new().await;
        let response = app(&ctx)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/register")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_accept_code_issues_tokens() {
        let ctx = TestContext::with_sender(MockCodeSender::with_codes(["123456"])).await;
        post_json(app(&ctx), "/auth/register", signup("a@b.com")).await;

        let (status, body) = post_json(
            app(&ctx),
            "/auth/accept-code",
            json!({"email": "a@b.com", "code": "123456"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "a@b.com");
        let access = body["access_token"].as_str().unwrap();
        let claims = ctx.state.tokens.extract_claims(access).unwrap();
        assert_eq!(claims.role, "user");
        assert_eq!(claims.username, "tom0011");
        assert_eq!(claims.country, "KR");
        assert_eq!(claims.user_id, body["id"].as_str().unwrap());
        assert!(!body["refresh_token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_accept_code_mismatch_keeps_record() {
        let ctx = TestContext::with_sender(MockCodeSender::with_codes(["123456"])).await;
        post_json(app(&ctx), "/auth/register", signup("a@b.com")).await;

        let (status, body) = post_json(
            app(&ctx),
            "/auth/accept-code",
            json!({"email": "a@b.com", "code": "000000"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid code");
        assert!(ctx.store.get_register("a@b.com").await.is_ok());
        assert!(ctx.identity.calls_to("register").is_empty());
    }

    #[tokio::test]
    async fn test_accept_code_without_pending_record() {
        let ctx = TestContext::new().await;
        let (status, body) = post_json(
            app(&ctx),
            "/auth/accept-code",
            json!({"email": "nobody@b.com", "code": "123456"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("failed to get pending registration"));
    }

    #[tokio::test]
    async fn test_accept_code_backend_failure() {
        let ctx = TestContext::with_sender(MockCodeSender::with_codes(["123456"])).await;
        ctx.identity.fail_register();
        post_json(app(&ctx), "/auth/register", signup("a@b.com")).await;

        let (status, _) = post_json(
            app(&ctx),
            "/auth/accept-code",
            json!({"email": "a@b.com", "code": "123456"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_user() {
        let ctx = TestContext::new().await;
        let (status, body) = post_json(
            app(&ctx),
            "/auth/forgot-password",
            json!({"email": "ghost@b.com"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "user not registered");
        assert!(ctx.sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_reset_password_flow() {
        let ctx = TestContext::with_sender(MockCodeSender::with_codes(["654321"])).await;
        ctx.identity
            .add_user("user-7", "a@b.com", "tom0011", "user", "old-pw");

        let (status, body) =
            post_json(app(&ctx), "/auth/forgot-password", json!({"email": "a@b.com"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "password reset code sent to your email");

        let (status, body) = post_json(
            app(&ctx),
            "/auth/reset-password",
            json!({"email": "a@b.com", "code": "111111", "new_password": "new-pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid code");

        let (status, body) = post_json(
            app(&ctx),
            "/auth/reset-password",
            json!({"email": "a@b.com", "code": "654321", "new_password": "new-pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "password reset successfully");
        assert_eq!(ctx.identity.password_of("a@b.com").as_deref(), Some("new-pw"));

        // 기본 설정에서는 코드가 남아 있음
        assert_eq!(ctx.store.get_code("a@b.com").await.unwrap(), "654321");
    }

    #[tokio::test]
    async fn test_reset_code_invalidated_when_configured() {
        let mut ctx = TestContext::with_sender(MockCodeSender::with_codes(["654321"])).await;
        ctx.state.auth.invalidate_reset_code = true;
        ctx.identity
            .add_user("user-7", "a@b.com", "tom0011", "user", "old-pw");

        post_json(app(&ctx), "/auth/forgot-password", json!({"email": "a@b.com"})).await;
        let (status, _) = post_json(
            app(&ctx),
            "/auth/reset-password",
            json!({"email": "a@b.com", "code": "654321", "new_password": "new-pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let err = ctx.store.get_code("a@b.com").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_reset_password_without_code() {
        let ctx = TestContext::new().await;
        let (status, body) = post_json(
            app(&ctx),
            "/auth/reset-password",
            json!({"email": "a@b.com", "code": "1", "new_password": "x"}),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "invalid or expired code");
    }

    #[tokio::test]
    async fn test_login_email() {
        let ctx = TestContext::new().await;
        ctx.identity
            .add_user("user-3", "a@b.com", "tom0011", "admin", "pw");

        let (status, body) = post_json(
            app(&ctx),
            "/auth/login/email",
            json!({"email": "a@b.com", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let claims = ctx
            .state
            .tokens
            .extract_claims(body["access_token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.user_id, "user-3");
        assert_eq!(claims.role, "admin");

        let (status, _) = post_json(
            app(&ctx),
            "/auth/login/email",
            json!({"email": "a@b.com", "password": "wrong"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_username_sets_cookies() {
        let ctx = TestContext::new().await;
        ctx.identity
            .add_user("user-3", "a@b.com", "tom0011", "", "pw");

        let response = app(&ctx)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/login/username")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({"username": "tom0011", "password": "pw"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("access_token="));
        assert!(cookies[1].starts_with("refresh_token="));
        assert!(cookies.iter().all(|c| c.contains("HttpOnly")));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let claims = ctx
            .state
            .tokens
            .extract_claims(body["access_token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.role, "user");
    }

    #[tokio::test]
    async fn test_register_admin_sends_hash() {
        let ctx = TestContext::new().await;
        let (status, body) = post_json(app(&ctx), "/auth/register-admin", json!({})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "admin registered");

        let calls = ctx.identity.calls_to("register_admin");
        let hash = calls[0]["message"].as_str().unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(crate::auth::verify_password("admin-secret", hash).is_ok());
    }
}
