//! 테스트용 mock 구현.
//!
//! 백엔드 gRPC 서비스, 코드 발송기, 오브젝트 스토리지를 메모리로 대체합니다.
//! 각 mock은 받은 요청을 기록해 두어 테스트에서 확인할 수 있습니다.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gateway_backend::proto::{post, user};
use gateway_backend::{
    BackendError, BackendResult, FeedService, IdentityService, ObjectStorage, StorageError,
    StorageResult,
};
use gateway_core::{AuthConfig, Identity};
use gateway_data::MemoryRegistrationStore;
use gateway_notification::{generate_code, CodeSender, NotificationError, NotificationResult, CODE_LENGTH};
use serde::Serialize;
use serde_json::Value;

use crate::auth::{PolicyEnforcer, PolicyRule, TokenCodec};
use crate::state::{AppState, Buckets};

pub const TEST_ACCESS_SECRET: &str = "test-access-secret-key-minimum-32-chars";
pub const TEST_REFRESH_SECRET: &str = "test-refresh-secret-key-minimum-32-chars";

/// 저장소에 포함된 Casbin 모델 파일.
pub const MODEL_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/model.conf");
/// 저장소에 포함된 정책 CSV.
pub const POLICY_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/policy.csv");

const MODEL: &str = include_str!("../../../config/model.conf");

/// 저장소의 모델에 주어진 규칙만 넣은 판정기.
pub async fn enforcer_with_rules(rules: Vec<PolicyRule>) -> PolicyEnforcer {
    PolicyEnforcer::from_rules(MODEL, rules).await.unwrap()
}

/// 기록된 호출 (메서드 이름, 요청 JSON).
pub type RecordedCall = (String, Value);

#[derive(Default)]
struct CallLog(Mutex<Vec<RecordedCall>>);

impl CallLog {
    fn record<T: Serialize>(&self, method: &str, req: &T) {
        let value = serde_json::to_value(req).unwrap_or(Value::Null);
        self.0.lock().unwrap().push((method.to_string(), value));
    }

    fn all(&self) -> Vec<RecordedCall> {
        self.0.lock().unwrap().clone()
    }
}

// ==================== Identity ====================

#[derive(Debug, Clone)]
struct StoredUser {
    identity: user::UserIdentity,
    password: String,
}

/// 메모리 사용자 백엔드.
#[derive(Default)]
pub struct MockIdentityService {
    users: Mutex<Vec<StoredUser>>,
    calls: CallLog,
    next_id: AtomicUsize,
    fail_register: AtomicBool,
}

impl MockIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 기존 사용자를 추가합니다.
    pub fn add_user(&self, id: &str, email: &str, username: &str, role: &str, password: &str) {
        self.users.lock().unwrap().push(StoredUser {
            identity: user::UserIdentity {
                id: id.to_string(),
                email: email.to_string(),
                username: username.to_string(),
                role: role.to_string(),
                country: "KR".to_string(),
            },
            password: password.to_string(),
        });
    }

    /// 이후 `register` 호출을 실패시킵니다.
    pub fn fail_register(&self) {
        self.fail_register.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.all()
    }

    /// 특정 메서드의 호출 요청만 반환합니다.
    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls
            .all()
            .into_iter()
            .filter(|(name, _)| name == method)
            .map(|(_, req)| req)
            .collect()
    }

    pub fn password_of(&self, email: &str) -> Option<String> {
        self.find(|u| u.identity.email == email).map(|u| u.password)
    }

    fn find(&self, pred: impl Fn(&StoredUser) -> bool) -> Option<StoredUser> {
        self.users.lock().unwrap().iter().find(|u| pred(u)).cloned()
    }
}

#[async_trait]
impl IdentityService for MockIdentityService {
    async fn register(&self, req: user::RegisterRequest) -> BackendResult<user::RegisterResponse> {
        self.calls.record("register", &req);
        if self.fail_register.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("identity backend is down".to_string()));
        }
        if self.find(|u| u.identity.email == req.email).is_some() {
            return Err(BackendError::AlreadyExists(format!("{} already registered", req.email)));
        }

        let id = format!("user-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.add_user(&id, &req.email, &req.username, "user", &req.password);
        Ok(user::RegisterResponse {
            id,
            email: req.email,
            flag: "registered".to_string(),
            ..Default::default()
        })
    }

    async fn login_email(&self, req: user::LoginEmailRequest) -> BackendResult<user::UserIdentity> {
        self.calls.record("login_email", &req);
        let stored = self
            .find(|u| u.identity.email == req.email)
            .ok_or_else(|| BackendError::NotFound("user not found".to_string()))?;
        if stored.password != req.password {
            return Err(BackendError::Unauthenticated("invalid credentials".to_string()));
        }
        Ok(stored.identity)
    }

    async fn login_username(
        &self,
        req: user::LoginUsernameRequest,
    ) -> BackendResult<user::UserIdentity> {
        self.calls.record("login_username", &req);
        let stored = self
            .find(|u| u.identity.username == req.username)
            .ok_or_else(|| BackendError::NotFound("user not found".to_string()))?;
        if stored.password != req.password {
            return Err(BackendError::Unauthenticated("invalid credentials".to_string()));
        }
        Ok(stored.identity)
    }

    async fn get_user_by_email(&self, req: user::Email) -> BackendResult<user::UserIdentity> {
        self.calls.record("get_user_by_email", &req);
        self.find(|u| u.identity.email == req.email)
            .map(|u| u.identity)
            .ok_or_else(|| BackendError::NotFound(format!("no user with email {}", req.email)))
    }

    async fn update_password(&self, req: user::UpdatePasswordReq) -> BackendResult<user::Message> {
        self.calls.record("update_password", &req);
        let mut users = self.users.lock().unwrap();
        let stored = users
            .iter_mut()
            .find(|u| u.identity.id == req.id)
            .ok_or_else(|| BackendError::NotFound(format!("user {} not found", req.id)))?;
        stored.password = req.password;
        Ok(user::Message {
            message: "password updated".to_string(),
        })
    }

    async fn register_admin(&self, req: user::Message) -> BackendResult<user::Message> {
        self.calls.record("register_admin", &req);
        Ok(user::Message {
            message: "admin registered".to_string(),
        })
    }

    async fn create_user(&self, req: user::CreateRequest) -> BackendResult<user::UserResponse> {
        self.calls.record("create_user", &req);
        Ok(user::UserResponse {
            id: "user-created".to_string(),
            email: req.email,
            phone: req.phone,
            first_name: req.first_name,
            last_name: req.last_name,
            username: req.username,
            nationality: req.nationality,
            bio: req.bio,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        })
    }

    async fn get_profile(&self, req: user::Id) -> BackendResult<user::GetProfileResponse> {
        self.calls.record("get_profile", &req);
        let stored = self
            .find(|u| u.identity.id == req.user_id)
            .ok_or_else(|| BackendError::NotFound(format!("user {} not found", req.user_id)))?;
        Ok(user::GetProfileResponse {
            email: stored.identity.email,
            username: stored.identity.username,
            nationality: stored.identity.country,
            ..Default::default()
        })
    }

    async fn update_profile(
        &self,
        req: user::UpdateProfileRequest,
    ) -> BackendResult<user::UserResponse> {
        self.calls.record("update_profile", &req);
        Ok(user::UserResponse {
            id: req.user_id,
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone_number,
            username: req.username,
            nationality: req.nationality,
            bio: req.bio,
            ..Default::default()
        })
    }

    async fn change_password(
        &self,
        req: user::ChangePasswordRequest,
    ) -> BackendResult<user::ChangePasswordResponse> {
        self.calls.record("change_password", &req);
        Ok(user::ChangePasswordResponse {
            message: "password changed".to_string(),
        })
    }

    async fn change_profile_image(&self, req: user::Url) -> BackendResult<user::Message> {
        self.calls.record("change_profile_image", &req);
        Ok(user::Message {
            message: "profile image updated".to_string(),
        })
    }

    async fn fetch_users(&self, req: user::Filter) -> BackendResult<user::UserResponses> {
        self.calls.record("fetch_users", &req);
        let users = self
            .users
            .lock()
            .unwrap()
            .iter()
            .map(|u| user::UserResponse {
                id: u.identity.id.clone(),
                email: u.identity.email.clone(),
                username: u.identity.username.clone(),
                ..Default::default()
            })
            .collect();
        Ok(user::UserResponses { users })
    }

    async fn list_of_following(&self, req: user::Id) -> BackendResult<user::Follows> {
        self.calls.record("list_of_following", &req);
        Ok(user::Follows::default())
    }

    async fn list_of_followers(&self, req: user::Id) -> BackendResult<user::Follows> {
        self.calls.record("list_of_followers", &req);
        Ok(user::Follows::default())
    }

    async fn delete_user(&self, req: user::Id) -> BackendResult<user::Message> {
        self.calls.record("delete_user", &req);
        Ok(user::Message {
            message: format!("user {} deleted", req.user_id),
        })
    }

    async fn follow(&self, req: user::FollowReq) -> BackendResult<user::FollowRes> {
        self.calls.record("follow", &req);
        Ok(user::FollowRes {
            following_id: req.following_id,
            followed_at: "2026-01-01T00:00:00Z".to_string(),
        })
    }

    async fn unfollow(&self, req: user::FollowReq) -> BackendResult<user::DFollowRes> {
        self.calls.record("unfollow", &req);
        Ok(user::DFollowRes {
            following_id: req.following_id,
            unfollowed_at: "2026-01-01T00:00:00Z".to_string(),
        })
    }

    async fn most_popular_user(&self, req: user::Void) -> BackendResult<user::UserResponse> {
        self.calls.record("most_popular_user", &req);
        Ok(user::UserResponse {
            id: "popular".to_string(),
            ..Default::default()
        })
    }

    fn name(&self) -> &str {
        "mock-identity"
    }
}

// ==================== Feed ====================

/// 요청을 그대로 돌려주는 게시글 백엔드.
#[derive(Default)]
pub struct MockFeedService {
    calls: CallLog,
}

impl MockFeedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.all()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls
            .all()
            .into_iter()
            .filter(|(name, _)| name == method)
            .map(|(_, req)| req)
            .collect()
    }
}

fn message(text: impl Into<String>) -> post::Message {
    post::Message {
        message: text.into(),
    }
}

#[async_trait]
impl FeedService for MockFeedService {
    async fn create_post(&self, req: post::Post) -> BackendResult<post::PostResponse> {
        self.calls.record("create_post", &req);
        Ok(post::PostResponse {
            id: "post-1".to_string(),
            user_id: req.user_id,
            country: req.country,
            location: req.location,
            title: req.title,
            description: req.description,
            hashtag: req.hashtag,
            content: req.content,
            image_url: req.image_url,
            ..Default::default()
        })
    }

    async fn update_post(&self, req: post::UpdateAPost) -> BackendResult<post::PostResponse> {
        self.calls.record("update_post", &req);
        Ok(post::PostResponse {
            id: req.id,
            user_id: req.user_id,
            title: req.title,
            content: req.content,
            ..Default::default()
        })
    }

    async fn delete_post(&self, req: post::PostId) -> BackendResult<post::Message> {
        self.calls.record("delete_post", &req);
        Ok(message(format!("post {} deleted", req.id)))
    }

    async fn get_post(&self, req: post::PostId) -> BackendResult<post::PostResponse> {
        self.calls.record("get_post", &req);
        if req.id == "missing" {
            return Err(BackendError::NotFound("post not found".to_string()));
        }
        Ok(post::PostResponse {
            id: req.id,
            ..Default::default()
        })
    }

    async fn list_posts(&self, req: post::PostList) -> BackendResult<post::PostListResponse> {
        self.calls.record("list_posts", &req);
        Ok(post::PostListResponse::default())
    }

    async fn get_posts_by_country(
        &self,
        req: post::PostCountry,
    ) -> BackendResult<post::PostListResponse> {
        self.calls.record("get_posts_by_country", &req);
        Ok(post::PostListResponse {
            post: vec![post::PostResponse {
                id: "post-1".to_string(),
                country: req.country,
                ..Default::default()
            }],
        })
    }

    async fn add_image_to_post(&self, req: post::ImageUrl) -> BackendResult<post::Message> {
        self.calls.record("add_image_to_post", &req);
        Ok(message("image added"))
    }

    async fn remove_image_from_post(&self, req: post::ImageUrl) -> BackendResult<post::Message> {
        self.calls.record("remove_image_from_post", &req);
        Ok(message("image removed"))
    }

    async fn create_comment(
        &self,
        req: post::CommentPost,
    ) -> BackendResult<post::CommentResponse> {
        self.calls.record("create_comment", &req);
        Ok(post::CommentResponse {
            id: "comment-1".to_string(),
            user_id: req.user_id,
            post_id: req.post_id,
            content: req.content,
            ..Default::default()
        })
    }

    async fn update_comment(
        &self,
        req: post::UpdateAComment,
    ) -> BackendResult<post::CommentResponse> {
        self.calls.record("update_comment", &req);
        Ok(post::CommentResponse {
            id: req.id,
            user_id: req.user_id,
            content: req.content,
            ..Default::default()
        })
    }

    async fn delete_comment(&self, req: post::CommentId) -> BackendResult<post::Message> {
        self.calls.record("delete_comment", &req);
        Ok(message(format!("comment {} deleted", req.id)))
    }

    async fn get_comment(&self, req: post::CommentId) -> BackendResult<post::CommentResponse> {
        self.calls.record("get_comment", &req);
        Ok(post::CommentResponse {
            id: req.id,
            ..Default::default()
        })
    }

    async fn list_comments(&self, req: post::CommentList) -> BackendResult<post::CommentsR> {
        self.calls.record("list_comments", &req);
        Ok(post::CommentsR::default())
    }

    async fn add_like_post(&self, req: post::LikePost) -> BackendResult<post::LikeResponse> {
        self.calls.record("add_like_post", &req);
        Ok(post::LikeResponse {
            post_id: req.post_id,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        })
    }

    async fn delete_like_post(&self, req: post::LikePost) -> BackendResult<post::Message> {
        self.calls.record("delete_like_post", &req);
        Ok(message("like removed"))
    }

    async fn add_like_comment(
        &self,
        req: post::LikeComment,
    ) -> BackendResult<post::LikeComResponse> {
        self.calls.record("add_like_comment", &req);
        Ok(post::LikeComResponse {
            comment_id: req.comment_id,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        })
    }

    async fn delete_like_comment(&self, req: post::LikeComment) -> BackendResult<post::Message> {
        self.calls.record("delete_like_comment", &req);
        Ok(message("like removed"))
    }

    async fn get_post_like_count(&self, req: post::PostId) -> BackendResult<post::LikeCount> {
        self.calls.record("get_post_like_count", &req);
        Ok(post::LikeCount { id: req.id, count: 3 })
    }

    fn name(&self) -> &str {
        "mock-feed"
    }
}

// ==================== Code sender ====================

/// 미리 정한 코드를 순서대로 "발송"하는 발송기.
///
/// 준비된 코드가 떨어지면 무작위 코드를 만듭니다.
#[derive(Default)]
pub struct MockCodeSender {
    codes: Mutex<VecDeque<String>>,
    sent: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl MockCodeSender {
    pub fn with_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: Mutex::new(codes.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// 이후 발송을 실패시킵니다.
    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// `(email, code)` 발송 기록.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeSender for MockCodeSender {
    async fn send_code(&self, email: &str) -> NotificationResult<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotificationError::SendFailed("smtp relay refused".to_string()));
        }
        let code = self
            .codes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| generate_code(CODE_LENGTH));
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.clone()));
        Ok(code)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ==================== Storage ====================

/// 업로드 내용을 메모리에 보관하는 스토리지.
#[derive(Default)]
pub struct MockObjectStorage {
    uploads: Mutex<HashMap<String, Vec<u8>>>,
    fail: AtomicBool,
}

impl MockObjectStorage {
    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// 업로드된 URL 목록.
    pub fn uploaded_urls(&self) -> Vec<String> {
        self.uploads.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        file_name: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> StorageResult<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected {
                status: 503,
                body: "storage unavailable".to_string(),
            });
        }
        let url = format!("http://storage.test/{}/{}", bucket, file_name);
        self.uploads.lock().unwrap().insert(url.clone(), bytes);
        Ok(url)
    }
}

// ==================== Context ====================

/// 테스트용 상태와 그 안의 mock 핸들 묶음.
pub struct TestContext {
    pub state: AppState,
    pub identity: Arc<MockIdentityService>,
    pub feed: Arc<MockFeedService>,
    pub sender: Arc<MockCodeSender>,
    pub store: Arc<MemoryRegistrationStore>,
    pub storage: Arc<MockObjectStorage>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_sender(MockCodeSender::default()).await
    }

    /// 지정한 발송기로 컨텍스트를 만듭니다.
    pub async fn with_sender(sender: MockCodeSender) -> Self {
        Self::with_settings(
            sender,
            AuthConfig {
                admin_password: "admin-secret".to_string(),
                ..AuthConfig::default()
            },
        )
        .await
    }

    /// 발송기와 인증 흐름 설정을 지정해 컨텍스트를 만듭니다.
    pub async fn with_settings(sender: MockCodeSender, auth: AuthConfig) -> Self {
        let identity = Arc::new(MockIdentityService::new());
        let feed = Arc::new(MockFeedService::new());
        let sender = Arc::new(sender);
        let store = Arc::new(MemoryRegistrationStore::new(
            Duration::from_secs(600),
            Duration::from_secs(600),
        ));
        let storage = Arc::new(MockObjectStorage::default());

        // 저장소에 포함된 정책 파일은 항상 로드 가능해야 합니다.
        let enforcer = PolicyEnforcer::load(MODEL_PATH, POLICY_PATH).await.unwrap();

        let state = AppState::new(
            TokenCodec::new(TEST_ACCESS_SECRET, TEST_REFRESH_SECRET, 60, 7),
            enforcer,
            store.clone(),
            sender.clone(),
            identity.clone(),
            feed.clone(),
            storage.clone(),
        )
        .with_auth_settings(auth)
        .with_buckets(Buckets::default());

        Self {
            state,
            identity,
            feed,
            sender,
            store,
            storage,
        }
    }

    /// 주어진 역할의 `Authorization` 헤더 값.
    pub fn bearer(&self, user_id: &str, role: &str) -> String {
        let identity = Identity::user(user_id, format!("{user_id}@test.dev"), user_id, "KR")
            .with_role(role);
        format!(
            "Bearer {}",
            self.state.tokens.issue_access_token(&identity).unwrap()
        )
    }
}
