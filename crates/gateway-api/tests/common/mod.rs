//! 통합 테스트 공용 헬퍼.
//!
//! [`gateway_api::testing::TestContext`]의 mock 백엔드 위에 전체 라우터를 올리고
//! HTTP 요청 헬퍼를 더합니다. 정책은 저장소의 `config/` 파일을 그대로 씁니다.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use gateway_api::routes::create_api_router;
use gateway_api::state::AppState;
use gateway_api::testing::{
    MockCodeSender, MockFeedService, MockIdentityService, TestContext,
};
use gateway_core::AuthConfig;
use gateway_data::MemoryRegistrationStore;
use serde_json::Value;
use tower::ServiceExt;

pub struct Gateway {
    pub state: Arc<AppState>,
    pub identity: Arc<MockIdentityService>,
    pub feed: Arc<MockFeedService>,
    pub sender: Arc<MockCodeSender>,
    pub store: Arc<MemoryRegistrationStore>,
}

impl Gateway {
    /// 준비된 인증 코드를 순서대로 발송하는 게이트웨이.
    pub async fn new(codes: &[&str]) -> Self {
        Self::with_auth(codes, AuthConfig::default()).await
    }

    pub async fn with_auth(codes: &[&str], auth: AuthConfig) -> Self {
        let ctx =
            TestContext::with_settings(MockCodeSender::with_codes(codes.iter().copied()), auth)
                .await;

        Self {
            state: Arc::new(ctx.state),
            identity: ctx.identity,
            feed: ctx.feed,
            sender: ctx.sender,
            store: ctx.store,
        }
    }

    pub fn router(&self) -> Router {
        create_api_router(self.state.clone()).with_state(self.state.clone())
    }

    /// 요청을 보내고 상태 코드와 JSON 본문을 돌려줍니다.
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn authorized(&self, method: &str, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// 사용자 백엔드의 특정 메서드 호출 횟수.
    pub fn identity_calls(&self, method: &str) -> usize {
        self.identity.calls_to(method).len()
    }
}
