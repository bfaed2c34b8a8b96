//! 관리자 endpoint (`/admin`). 대상 사용자는 경로의 `user_id`입니다.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use gateway_backend::proto::user;
use tracing::info;

use super::upload::{read_multipart, upload_to};
use super::user::UpdateProfileBody;
use crate::error::{backend_error, ApiResult, JsonBody};
use crate::state::AppState;

/// POST /admin/create
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<user::CreateRequest>,
) -> ApiResult<(StatusCode, Json<user::UserResponse>)> {
    let created = state
        .identity
        .create_user(req)
        .await
        .map_err(backend_error)?;

    info!(user_id = %created.id, "User created by admin");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /admin/get_profile_by_id/{user_id}
pub async fn get_profile_by_id(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<user::GetProfileResponse>> {
    let profile = state
        .identity
        .get_profile(user::Id { user_id })
        .await
        .map_err(backend_error)?;
    Ok(Json(profile))
}

/// PUT /admin/update_profile/{user_id}
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    JsonBody(body): JsonBody<UpdateProfileBody>,
) -> ApiResult<Json<user::UserResponse>> {
    let updated = state
        .identity
        .update_profile(body.into_request(user_id))
        .await
        .map_err(backend_error)?;
    Ok(Json(updated))
}

/// PUT /admin/change_profile_image/{user_id} (multipart `file`)
pub async fn change_profile_image(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
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

/// DELETE /admin/delete/{user_id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<user::Message>> {
    let res = state
        .identity
        .delete_user(user::Id {
            user_id: user_id.clone(),
        })
        .await
        .map_err(backend_error)?;

    info!(user_id = %user_id, "User deleted by admin");
    Ok(Json(res))
}

/// 관리자 라우터 생성.
pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(create_user))
        .route("/get_profile_by_id/{user_id}", get(get_profile_by_id))
        .route("/update_profile/{user_id}", put(update_profile))
        .route("/change_profile_image/{user_id}", put(change_profile_image))
        .route("/delete/{user_id}", delete(delete_user))
}
