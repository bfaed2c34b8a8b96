//! 사용자/인증 백엔드 gRPC 클라이언트.

use async_trait::async_trait;

use super::channel::{ChannelSettings, UnaryClient};
use crate::error::BackendResult;
use crate::proto::user;
use crate::traits::IdentityService;

mod path {
    pub const REGISTER: &str = "/user.AuthService/Register";
    pub const LOGIN_EMAIL: &str = "/user.AuthService/LoginEmail";
    pub const LOGIN_USERNAME: &str = "/user.AuthService/LoginUsername";
    pub const GET_USER_BY_EMAIL: &str = "/user.AuthService/GetUserByEmail";
    pub const UPDATE_PASSWORD: &str = "/user.AuthService/UpdatePassword";
    pub const REGISTER_ADMIN: &str = "/user.AuthService/RegisterAdmin";

    pub const CREATE: &str = "/user.UserService/Create";
    pub const GET_PROFILE: &str = "/user.UserService/GetProfile";
    pub const UPDATE_PROFILE: &str = "/user.UserService/UpdateProfile";
    pub const CHANGE_PASSWORD: &str = "/user.UserService/ChangePassword";
    pub const CHANGE_PROFILE_IMAGE: &str = "/user.UserService/ChangeProfileImage";
    pub const FETCH_USERS: &str = "/user.UserService/FetchUsers";
    pub const LIST_OF_FOLLOWING: &str = "/user.UserService/ListOfFollowing";
    pub const LIST_OF_FOLLOWERS: &str = "/user.UserService/ListOfFollowers";
    pub const DELETE_USER: &str = "/user.UserService/DeleteUser";
    pub const FOLLOW: &str = "/user.UserService/Follow";
    pub const UNFOLLOW: &str = "/user.UserService/Unfollow";
    pub const MOST_POPULAR_USER: &str = "/user.UserService/MostPopularUser";
}

/// `AuthService` + `UserService` 클라이언트.
#[derive(Clone)]
pub struct GrpcIdentityClient {
    client: UnaryClient,
}

impl GrpcIdentityClient {
    /// 지연 연결 클라이언트를 생성합니다.
    pub fn connect_lazy(settings: &ChannelSettings) -> BackendResult<Self> {
        Ok(Self {
            client: UnaryClient::connect_lazy(settings)?,
        })
    }
}

#[async_trait]
impl IdentityService for GrpcIdentityClient {
    async fn register(&self, req: user::RegisterRequest) -> BackendResult<user::RegisterResponse> {
        self.client.unary(path::REGISTER, req).await
    }

    async fn login_email(&self, req: user::LoginEmailRequest) -> BackendResult<user::UserIdentity> {
        self.client.unary(path::LOGIN_EMAIL, req).await
    }

    async fn login_username(
        &self,
        req: user::LoginUsernameRequest,
    ) -> BackendResult<user::UserIdentity> {
        self.client.unary(path::LOGIN_USERNAME, req).await
    }

    async fn get_user_by_email(&self, req: user::Email) -> BackendResult<user::UserIdentity> {
        self.client.unary(path::GET_USER_BY_EMAIL, req).await
    }

    async fn update_password(&self, req: user::UpdatePasswordReq) -> BackendResult<user::Message> {
        self.client.unary(path::UPDATE_PASSWORD, req).await
    }

    async fn register_admin(&self, req: user::Message) -> BackendResult<user::Message> {
        self.client.unary(path::REGISTER_ADMIN, req).await
    }

    async fn create_user(&self, req: user::CreateRequest) -> BackendResult<user::UserResponse> {
        self.client.unary(path::CREATE, req).await
    }

    async fn get_profile(&self, req: user::Id) -> BackendResult<user::GetProfileResponse> {
        self.client.unary(path::GET_PROFILE, req).await
    }

    async fn update_profile(
        &self,
        req: user::UpdateProfileRequest,
    ) -> BackendResult<user::UserResponse> {
        self.client.unary(path::UPDATE_PROFILE, req).await
    }

    async fn change_password(
        &self,
        req: user::ChangePasswordRequest,
    ) -> BackendResult<user::ChangePasswordResponse> {
        self.client.unary(path::CHANGE_PASSWORD, req).await
    }

    async fn change_profile_image(&self, req: user::Url) -> BackendResult<user::Message> {
        self.client.unary(path::CHANGE_PROFILE_IMAGE, req).await
    }

    async fn fetch_users(&self, req: user::Filter) -> BackendResult<user::UserResponses> {
        self.client.unary(path::FETCH_USERS, req).await
    }

    async fn list_of_following(&self, req: user::Id) -> BackendResult<user::Follows> {
        self.client.unary(path::LIST_OF_FOLLOWING, req).await
    }

    async fn list_of_followers(&self, req: user::Id) -> BackendResult<user::Follows> {
        self.client.unary(path::LIST_OF_FOLLOWERS, req).await
    }

    async fn delete_user(&self, req: user::Id) -> BackendResult<user::Message> {
        self.client.unary(path::DELETE_USER, req).await
    }

    async fn follow(&self, req: user::FollowReq) -> BackendResult<user::FollowRes> {
        self.client.unary(path::FOLLOW, req).await
    }

    async fn unfollow(&self, req: user::FollowReq) -> BackendResult<user::DFollowRes> {
        self.client.unary(path::UNFOLLOW, req).await
    }

    async fn most_popular_user(&self, req: user::Void) -> BackendResult<user::UserResponse> {
        self.client.unary(path::MOST_POPULAR_USER, req).await
    }

    fn name(&self) -> &str {
        self.client.target()
    }
}
