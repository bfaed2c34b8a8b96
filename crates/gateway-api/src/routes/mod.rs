//! API 라우트.
//!
//! # 라우트 구조
//!
//! 공개:
//! - `/health`, `/health/ready` - 헬스 체크
//! - `/auth` - 가입, 인증 코드 확인, 비밀번호 재설정, 로그인
//!
//! 권한 미들웨어 뒤:
//! - `/user` - 본인 프로필, 팔로우
//! - `/admin` - 사용자 관리
//! - `/post` - 게시글
//! - `/comment` - 댓글
//! - `/like` - 좋아요

pub mod admin;
pub mod auth;
pub mod comment;
pub mod health;
pub mod like;
pub mod post;
pub mod upload;
pub mod user;

pub use admin::admin_router;
pub use auth::{auth_router, InfoResponse, MessageResponse, RegisterRequest};
pub use comment::{comment_router, CommentEnvelope, CommentsEnvelope};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use like::{like_router, DataEnvelope};
pub use post::{post_router, PostEnvelope, PostsEnvelope};
pub use user::user_router;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, middleware, Router};

use crate::auth::permission_middleware;
use crate::state::AppState;

/// 업로드 요청 본문 최대 크기.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// 전체 API 라우터 생성.
///
/// 보호 대상 라우터에는 `route_layer`로 권한 미들웨어를 붙이므로
/// 매칭된 경로 템플릿이 정책 검사에 그대로 사용됩니다.
pub fn create_api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .nest("/user", user_router())
        .nest("/admin", admin_router())
        .nest("/post", post_router())
        .nest("/comment", comment_router())
        .nest("/like", like_router())
        .route_layer(middleware::from_fn_with_state(state, permission_middleware));

    Router::new()
        .merge(health_router())
        .nest("/auth", auth_router())
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(ctx: &TestContext) -> Router {
        let state = Arc::new(ctx.state.clone());
        create_api_router(state.clone()).with_state(state)
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let ctx = TestContext::new().await;
        let (status, _) = send(app(&ctx), get("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_without_token() {
        let ctx = TestContext::new().await;
        let (status, body) = send(app(&ctx), get("/user/get_profile", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "token is empty");
        assert!(ctx.identity.calls().is_empty());
    }

    #[tokio::test]
    async fn test_user_role_cannot_reach_admin() {
        let ctx = TestContext::new().await;
        let token = ctx.bearer("user-1", "user");
        let (status, body) =
            send(app(&ctx), get("/admin/get_profile_by_id/user-2", Some(&token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "you don't have permission");
        assert!(ctx.identity.calls().is_empty());
    }

    #[tokio::test]
    async fn test_admin_inherits_user_routes() {
        let ctx = TestContext::new().await;
        ctx.identity
            .add_user("admin-1", "root@example.com", "root", "admin", "pw");
        let token = ctx.bearer("admin-1", "admin");
        let (status, _) = send(app(&ctx), get("/user/get_profile", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ctx.identity.calls_to("get_profile").len(), 1);
    }

    #[tokio::test]
    async fn test_get_post_wraps_response() {
        let ctx = TestContext::new().await;
        let token = ctx.bearer("user-1", "user");
        let (status, body) = send(app(&ctx), get("/post/getBy/p-1", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["post"]["id"], "p-1");
    }

    #[tokio::test]
    async fn test_missing_post_maps_to_not_found() {
        let ctx = TestContext::new().await;
        let token = ctx.bearer("user-1", "user");
        let (status, body) = send(app(&ctx), get("/post/getBy/missing", Some(&token))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_comment_create_uses_token_user() {
        let ctx = TestContext::new().await;
        let token = ctx.bearer("user-7", "user");
        let req = json_request(
            "POST",
            "/comment/create",
            &token,
            serde_json::json!({"post_id": "p-1", "content": "nice"}),
        );
        let (status, body) = send(app(&ctx), req).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["comment"]["user_id"], "user-7");
        assert_eq!(body["comment"]["post_id"], "p-1");
    }

    #[tokio::test]
    async fn test_comment_list_accepts_id_alias() {
        let ctx = TestContext::new().await;
        let token = ctx.bearer("user-1", "user");
        let (status, _) = send(
            app(&ctx),
            get("/comment/list?id=p-9&limit=5", Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let calls = ctx.feed.calls_to("list_comments");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["post_id"], "p-9");
        assert_eq!(calls[0]["limit"], 5);
        assert_eq!(calls[0]["offset"], 1);
    }

    #[tokio::test]
    async fn test_like_count_wraps_data() {
        let ctx = TestContext::new().await;
        let token = ctx.bearer("user-1", "user");
        let (status, body) =
            send(app(&ctx), get("/like/post/count/p-1", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 3);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let ctx = TestContext::new().await;
        let token = ctx.bearer("user-1", "user");
        let req = Request::builder()
            .method("POST")
            .uri("/like/create")
            .header(header::AUTHORIZATION, token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(app(&ctx), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert!(ctx.feed.calls().is_empty());
    }
}
