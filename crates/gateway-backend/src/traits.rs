//! 백엔드 서비스 추상화.
//!
//! 라우트 핸들러는 이 trait만 알고, 실제 구현(gRPC 클라이언트)은
//! `AppState`를 통해 주입됩니다. 테스트에서는 모의 구현으로 교체합니다.

use async_trait::async_trait;

use crate::error::BackendResult;
use crate::proto::{post, user};

// =============================================================================
// IdentityService
// =============================================================================

/// 사용자/인증 백엔드.
///
/// # Errors
///
/// 모든 메서드는 백엔드 상태를 [`crate::BackendError`]로 분류해 반환합니다.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// 검증이 끝난 가입 정보로 사용자를 생성합니다.
    async fn register(&self, req: user::RegisterRequest) -> BackendResult<user::RegisterResponse>;

    /// 이메일/비밀번호 로그인.
    async fn login_email(&self, req: user::LoginEmailRequest) -> BackendResult<user::UserIdentity>;

    /// 사용자명/비밀번호 로그인.
    async fn login_username(
        &self,
        req: user::LoginUsernameRequest,
    ) -> BackendResult<user::UserIdentity>;

    /// 이메일로 사용자를 조회합니다. 없으면 `NotFound`.
    async fn get_user_by_email(&self, req: user::Email) -> BackendResult<user::UserIdentity>;

    /// 비밀번호를 새 값으로 교체합니다 (재설정 흐름).
    async fn update_password(&self, req: user::UpdatePasswordReq) -> BackendResult<user::Message>;

    /// 관리자 계정을 등록합니다. `message`에는 해시된 비밀번호가 들어갑니다.
    async fn register_admin(&self, req: user::Message) -> BackendResult<user::Message>;

    async fn create_user(&self, req: user::CreateRequest) -> BackendResult<user::UserResponse>;

    async fn get_profile(&self, req: user::Id) -> BackendResult<user::GetProfileResponse>;

    async fn update_profile(
        &self,
        req: user::UpdateProfileRequest,
    ) -> BackendResult<user::UserResponse>;

    async fn change_password(
        &self,
        req: user::ChangePasswordRequest,
    ) -> BackendResult<user::ChangePasswordResponse>;

    async fn change_profile_image(&self, req: user::Url) -> BackendResult<user::Message>;

    async fn fetch_users(&self, req: user::Filter) -> BackendResult<user::UserResponses>;

    async fn list_of_following(&self, req: user::Id) -> BackendResult<user::Follows>;

    async fn list_of_followers(&self, req: user::Id) -> BackendResult<user::Follows>;

    async fn delete_user(&self, req: user::Id) -> BackendResult<user::Message>;

    async fn follow(&self, req: user::FollowReq) -> BackendResult<user::FollowRes>;

    async fn unfollow(&self, req: user::FollowReq) -> BackendResult<user::DFollowRes>;

    async fn most_popular_user(&self, req: user::Void) -> BackendResult<user::UserResponse>;

    /// 구현 이름 (로그용).
    fn name(&self) -> &str {
        "identity"
    }
}

// =============================================================================
// FeedService
// =============================================================================

/// 게시글/댓글/좋아요 백엔드.
#[async_trait]
pub trait FeedService: Send + Sync {
    // 게시글
    async fn create_post(&self, req: post::Post) -> BackendResult<post::PostResponse>;
    async fn update_post(&self, req: post::UpdateAPost) -> BackendResult<post::PostResponse>;
    async fn delete_post(&self, req: post::PostId) -> BackendResult<post::Message>;
    async fn get_post(&self, req: post::PostId) -> BackendResult<post::PostResponse>;
    async fn list_posts(&self, req: post::PostList) -> BackendResult<post::PostListResponse>;
    async fn get_posts_by_country(
        &self,
        req: post::PostCountry,
    ) -> BackendResult<post::PostListResponse>;
    async fn add_image_to_post(&self, req: post::ImageUrl) -> BackendResult<post::Message>;
    async fn remove_image_from_post(&self, req: post::ImageUrl) -> BackendResult<post::Message>;

    // 댓글
    async fn create_comment(&self, req: post::CommentPost)
        -> BackendResult<post::CommentResponse>;
    async fn update_comment(
        &self,
        req: post::UpdateAComment,
    ) -> BackendResult<post::CommentResponse>;
    async fn delete_comment(&self, req: post::CommentId) -> BackendResult<post::Message>;
    async fn get_comment(&self, req: post::CommentId) -> BackendResult<post::CommentResponse>;
    async fn list_comments(&self, req: post::CommentList) -> BackendResult<post::CommentsR>;

    // 좋아요
    async fn add_like_post(&self, req: post::LikePost) -> BackendResult<post::LikeResponse>;
    async fn delete_like_post(&self, req: post::LikePost) -> BackendResult<post::Message>;
    async fn add_like_comment(
        &self,
        req: post::LikeComment,
    ) -> BackendResult<post::LikeComResponse>;
    async fn delete_like_comment(&self, req: post::LikeComment) -> BackendResult<post::Message>;
    async fn get_post_like_count(&self, req: post::PostId) -> BackendResult<post::LikeCount>;

    /// 구현 이름 (로그용).
    fn name(&self) -> &str {
        "feed"
    }
}
