//! 사용자 endpoint (`/user`).
//!
//! 모든 핸들러는 권한 미들웨어 뒤에 있으며 대상 사용자는 토큰의 `user_id`입니다.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use gateway_backend::proto::user;
use serde::Deserialize;

use super::upload::{read_multipart, upload_to};
use crate::auth::CurrentUser;
use crate::error::{backend_error, ApiResult, JsonBody, QueryParams};
use crate::state::AppState;

const DEFAULT_PAGE: i32 = 1;
const DEFAULT_LIMIT: i32 = 10;

/// 프로필 수정 본문.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileBody {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub username: String,
    pub nationality: String,
    pub bio: String,
}

impl UpdateProfileBody {
    pub(crate) fn into_request(self, user_id: String) -> user::UpdateProfileRequest {
        user::UpdateProfileRequest {
            user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            phone_number: self.phone_number,
            username: self.username,
            nationality: self.nationality,
            bio: self.bio,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordBody {
    pub current_password: String,
    pub new_password: String,
}

/// 사용자 목록 조회 쿼리. 숫자가 아닌 `page`/`limit`은 기본값으로 대체됩니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchUsersQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub name: Option<String>,
}

impl FetchUsersQuery {
    fn into_filter(self) -> user::Filter {
        user::Filter {
            page: parse_or(self.page.as_deref(), DEFAULT_PAGE),
            limit: parse_or(self.limit.as_deref(), DEFAULT_LIMIT),
            first_name: self.name.unwrap_or_default(),
        }
    }
}

pub(crate) fn parse_or<T: std::str::FromStr>(value: Option<&str>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowBody {
    pub following_id: String,
}

// ==================== Handlers ====================

/// GET /user/get_profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Json<user::GetProfileResponse>> {
    let profile = state
        .identity
        .get_profile(user::Id { user_id })
        .await
        .map_err(backend_error)?;
    Ok(Json(profile))
}

/// PUT /user/update_profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    JsonBody(body): JsonBody<UpdateProfileBody>,
) -> ApiResult<Json<user::UserResponse>> {
    let updated = state
        .identity
        .update_profile(body.into_request(user_id))
        .await
        .map_err(backend_error)?;
    Ok(Json(updated))
}

/// PUT /user/change_password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    JsonBody(body): JsonBody<ChangePasswordBody>,
) -> ApiResult<Json<user::ChangePasswordResponse>> {
    let res = state
        .identity
        .change_password(user::ChangePasswordRequest {
            user_id,
            current_password: body.current_password,
            new_password: body.new_password,
        })
        .await
        .map_err(backend_error)?;
    Ok(Json(res))
}

/// 프로필 이미지를 업로드하고 백엔드에 URL을 기록합니다.
///
/// PUT /user/change_profile_image (multipart `file`)
pub async fn change_profile_image(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<user::Message>> {
    let file = read_multipart(multipart).await?.require_file()?;
    let url = upload_to(&state, &state.buckets.profile, file).await?;

    let res = state
        .identity
        .change_profile_image(user::Url { user_id, url })
        .await
        .map_err(backend_error)?;
    Ok(Json(res))
}

/// GET /user/fetch_users?page=&limit=&name=
pub async fn fetch_users(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<FetchUsersQuery>,
) -> ApiResult<Json<user::UserResponses>> {
    let users = state
        .identity
        .fetch_users(query.into_filter())
        .await
        .map_err(backend_error)?;
    Ok(Json(users))
}

/// GET /user/list_of_following
pub async fn list_of_following(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Json<user::Follows>> {
    let follows = state
        .identity
        .list_of_following(user::Id { user_id })
        .await
        .map_err(backend_error)?;
    Ok(Json(follows))
}

/// GET /user/list_of_followers
pub async fn list_of_followers(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Json<user::Follows>> {
    let follows = state
        .identity
        .list_of_followers(user::Id { user_id })
        .await
        .map_err(backend_error)?;
    Ok(Json(follows))
}

/// POST /user/follow
pub async fn follow(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    JsonBody(body): JsonBody<FollowBody>,
) -> ApiResult<Json<user::FollowRes>> {
    let res = state
        .identity
        .follow(user::FollowReq {
            following_id: body.following_id,
            follower_id: user_id,
        })
        .await
        .map_err(backend_error)?;
    Ok(Json(res))
}

/// DELETE /user/unfollow/{id}
pub async fn unfollow(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(following_id): Path<String>,
) -> ApiResult<Json<user::DFollowRes>> {
    let res = state
        .identity
        .unfollow(user::FollowReq {
            following_id,
            follower_id: user_id,
        })
        .await
        .map_err(backend_error)?;
    Ok(Json(res))
}

/// GET /user/most_popular
pub async fn most_popular(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<user::UserResponse>> {
    let res = state
        .identity
        .most_popular_user(user::Void {})
        .await
        .map_err(backend_error)?;
    Ok(Json(res))
}

/// 사용자 라우터 생성.
pub fn user_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/get_profile", get(get_profile))
        .route("/update_profile", put(update_profile))
        .route("/change_password", put(change_password))
        .route("/change_profile_image", put(change_profile_image))
        .route("/fetch_users", get(fetch_users))
        .route("/list_of_following", get(list_of_following))
        .route("/list_of_followers", get(list_of_followers))
        .route("/follow", post(follow))
        .route("/unfollow/{id}", delete(unfollow))
        .route("/most_popular", get(most_popular))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_users_defaults() {
        let filter = FetchUsersQuery::default().into_filter();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, 10);
        assert!(filter.first_name.is_empty());

        let filter = FetchUsersQuery {
            page: Some("3".into()),
            limit: Some("abc".into()),
            name: Some("tom".into()),
        }
        .into_filter();
        assert_eq!(filter.page, 3);
        assert_eq!(filter.limit, 10);
        assert_eq!(filter.first_name, "tom");
    }
}
