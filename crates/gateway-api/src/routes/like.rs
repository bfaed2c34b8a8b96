//! 좋아요 endpoint (`/like`). 응답은 `{"data": ...}` 형식입니다.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use gateway_backend::proto::post as pb;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::error::{backend_error, ApiResult, JsonBody};
use crate::state::AppState;

/// `{"data": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikePostBody {
    pub post_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikeCommentBody {
    pub comment_id: String,
}

/// POST /like/create
pub async fn like_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    JsonBody(body): JsonBody<LikePostBody>,
) -> ApiResult<Json<DataEnvelope<pb::LikeResponse>>> {
    let res = state
        .feed
        .add_like_post(pb::LikePost {
            user_id,
            post_id: body.post_id,
        })
        .await
        .map_err(backend_error)?;
    Ok(Json(DataEnvelope { data: res }))
}

/// DELETE /like/delete/{post_id}
pub async fn unlike_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(post_id): Path<String>,
) -> ApiResult<Json<DataEnvelope<pb::Message>>> {
    let res = state
        .feed
        .delete_like_post(pb::LikePost { user_id, post_id })
        .await
        .map_err(backend_error)?;
    Ok(Json(DataEnvelope { data: res }))
}

/// POST /like/comment/create
pub async fn like_comment(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    JsonBody(body): JsonBody<LikeCommentBody>,
) -> ApiResult<Json<DataEnvelope<pb::LikeComResponse>>> {
    let res = state
        .feed
        .add_like_comment(pb::LikeComment {
            user_id,
            comment_id: body.comment_id,
        })
        .await
        .map_err(backend_error)?;
    Ok(Json(DataEnvelope { data: res }))
}

/// DELETE /like/comment/delete/{comment_id}
pub async fn unlike_comment(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(comment_id): Path<String>,
) -> ApiResult<Json<DataEnvelope<pb::Message>>> {
    let res = state
        .feed
        .delete_like_comment(pb::LikeComment {
            user_id,
            comment_id,
        })
        .await
        .map_err(backend_error)?;
    Ok(Json(DataEnvelope { data: res }))
}

/// GET /like/post/count/{post_id}
pub async fn post_like_count(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<DataEnvelope<pb::LikeCount>>> {
    let res = state
        .feed
        .get_post_like_count(pb::PostId { id: post_id })
        .await
        .map_err(backend_error)?;
    Ok(Json(DataEnvelope { data: res }))
}

/// 좋아요 라우터 생성.
pub fn like_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(like_post))
        .route("/delete/{post_id}", delete(unlike_post))
        .route("/comment/create", post(like_comment))
        .route("/comment/delete/{comment_id}", delete(unlike_comment))
        .route("/post/count/{post_id}", get(post_like_count))
}
