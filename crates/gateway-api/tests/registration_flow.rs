//! 가입 및 비밀번호 재설정 흐름 통합 테스트.
//!
//! 전체 라우터를 통해 요청을 보내고 발급된 토큰으로 보호된 경로까지 확인합니다.

mod common;

use axum::http::StatusCode;
use common::Gateway;
use gateway_core::AuthConfig;
use gateway_data::RegistrationStore;
use serde_json::json;

fn alice(password: &str) -> serde_json::Value {
    json!({
        "first_name": "Alice",
        "last_name": "Kim",
        "email": "alice@example.com",
        "phone": "+998900000000",
        "username": "alice",
        "country": "Uzbekistan",
        "bio": "traveller",
        "password": password,
    })
}

#[tokio::test]
async fn register_then_accept_code_issues_user_tokens() {
    let gw = Gateway::new(&["1234"]).await;

    let (status, body) = gw.post_json("/auth/register", alice("pw-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"], "code sent to this email alice@example.com");
    assert_eq!(
        gw.sender.sent(),
        vec![("alice@example.com".to_string(), "1234".to_string())]
    );
    let pending = gw.store.get_register("alice@example.com").await.unwrap();
    assert_eq!(pending.code, "1234");

    let (status, body) = gw
        .post_json(
            "/auth/accept-code",
            json!({"email": "alice@example.com", "code": "1234"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(gw.identity_calls("register"), 1);

    let access = body["access_token"].as_str().unwrap().to_string();
    assert!(!body["refresh_token"].as_str().unwrap().is_empty());

    let claims = gw.state.tokens.extract_claims(&access).unwrap();
    assert_eq!(claims.role, "user");
    assert_eq!(claims.email, "alice@example.com");
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.country, "Uzbekistan");

    // 발급된 토큰으로 보호된 경로 접근
    let (status, body) = gw.authorized("GET", "/user/get_profile", &access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn mismatched_code_does_not_create_account() {
    let gw = Gateway::new(&["1234"]).await;
    gw.post_json("/auth/register", alice("pw-1")).await;

    let (status, body) = gw
        .post_json(
            "/auth/accept-code",
            json!({"email": "alice@example.com", "code": "9999"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid code");
    assert_eq!(gw.identity_calls("register"), 0);

    // 대기 레코드는 남아 있어 올바른 코드로 재시도할 수 있음
    let (status, _) = gw
        .post_json(
            "/auth/accept-code",
            json!({"email": "alice@example.com", "code": "1234"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn forgot_password_for_unknown_email() {
    let gw = Gateway::new(&["5555"]).await;

    let (status, body) = gw
        .post_json("/auth/forgot-password", json!({"email": "ghost@example.com"}))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "user not registered");
    assert!(gw.sender.sent().is_empty());
    assert!(gw.store.get_code("ghost@example.com").await.is_err());
}

#[tokio::test]
async fn reset_password_updates_looked_up_account() {
    let gw = Gateway::new(&["4321"]).await;
    gw.identity
        .add_user("acc-42", "bob@example.com", "bob", "user", "old-pw");

    let (status, body) = gw
        .post_json("/auth/forgot-password", json!({"email": "bob@example.com"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "password reset code sent to your email");

    let (status, body) = gw
        .post_json(
            "/auth/reset-password",
            json!({"email": "bob@example.com", "code": "4321", "new_password": "new-pw"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "password reset successfully");
    assert_eq!(gw.identity_calls("update_password"), 1);
    assert_eq!(gw.identity.password_of("bob@example.com").unwrap(), "new-pw");

    // 기본 설정에서는 코드가 TTL까지 유지됨
    assert_eq!(gw.store.get_code("bob@example.com").await.unwrap(), "4321");

    let (status, body) = gw
        .post_json(
            "/auth/login/email",
            json!({"email": "bob@example.com", "password": "new-pw"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
async fn reset_code_is_single_use_when_invalidation_enabled() {
    let auth = AuthConfig {
        invalidate_reset_code: true,
        ..AuthConfig::default()
    };
    let gw = Gateway::with_auth(&["4321"], auth).await;
    gw.identity
        .add_user("acc-42", "bob@example.com", "bob", "user", "old-pw");

    gw.post_json("/auth/forgot-password", json!({"email": "bob@example.com"}))
        .await;
    let reset = json!({"email": "bob@example.com", "code": "4321", "new_password": "new-pw"});

    let (status, _) = gw.post_json("/auth/reset-password", reset.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = gw.post_json("/auth/reset-password", reset).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "invalid or expired code");
}

#[tokio::test]
async fn later_registration_overwrites_earlier_code() {
    let gw = Gateway::new(&["1111", "2222"]).await;

    gw.post_json("/auth/register", alice("first")).await;
    gw.post_json("/auth/register", alice("second")).await;

    let (status, body) = gw
        .post_json(
            "/auth/accept-code",
            json!({"email": "alice@example.com", "code": "1111"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid code");

    let (status, _) = gw
        .post_json(
            "/auth/accept-code",
            json!({"email": "alice@example.com", "code": "2222"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        gw.identity.password_of("alice@example.com").unwrap(),
        "second"
    );
}

#[tokio::test]
async fn concurrent_registrations_leave_exactly_one_code() {
    let gw = Gateway::new(&["1111", "2222"]).await;

    let (a, b) = tokio::join!(
        gw.post_json("/auth/register", alice("first")),
        gw.post_json("/auth/register", alice("second")),
    );
    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);

    let winner = gw.store.get_register("alice@example.com").await.unwrap();
    let loser = if winner.code == "1111" { "2222" } else { "1111" };

    let (status, body) = gw
        .post_json(
            "/auth/accept-code",
            json!({"email": "alice@example.com", "code": loser}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid code");

    let (status, _) = gw
        .post_json(
            "/auth/accept-code",
            json!({"email": "alice@example.com", "code": winner.code}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gw.identity_calls("register"), 1);
}
