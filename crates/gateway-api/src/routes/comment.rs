//! 댓글 endpoint (`/comment`).

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use gateway_backend::proto::post as pb;
use serde::{Deserialize, Serialize};

use super::user::parse_or;
use crate::auth::CurrentUser;
use crate::error::{backend_error, ApiResult, JsonBody, QueryParams};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 10;
const DEFAULT_OFFSET: i64 = 1;

/// `{"comment": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentEnvelope<T> {
    pub comment: T,
}

/// `{"comments": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsEnvelope<T> {
    pub comments: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentBody {
    pub post_id: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCommentBody {
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCommentsQuery {
    #[serde(alias = "id")]
    pub post_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// POST /comment/create
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    JsonBody(body): JsonBody<CreateCommentBody>,
) -> ApiResult<(StatusCode, Json<CommentEnvelope<pb::CommentResponse>>)> {
    let created = state
        .feed
        .create_comment(pb::CommentPost {
            user_id,
            post_id: body.post_id,
            content: body.content,
        })
        .await
        .map_err(backend_error)?;
    Ok((StatusCode::CREATED, Json(CommentEnvelope { comment: created })))
}

/// PUT /comment/update
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    JsonBody(body): JsonBody<UpdateCommentBody>,
) -> ApiResult<Json<CommentEnvelope<pb::CommentResponse>>> {
    let updated = state
        .feed
        .update_comment(pb::UpdateAComment {
            id: body.id,
            user_id,
            content: body.content,
        })
        .await
        .map_err(backend_error)?;
    Ok(Json(CommentEnvelope { comment: updated }))
}

/// GET /comment/getBy/{id}
pub async fn get_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<CommentEnvelope<pb::CommentResponse>>> {
    let res = state
        .feed
        .get_comment(pb::CommentId { id })
        .await
        .map_err(backend_error)?;
    Ok(Json(CommentEnvelope { comment: res }))
}

/// GET /comment/list?post_id=&limit=&offset=
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<ListCommentsQuery>,
) -> ApiResult<Json<CommentsEnvelope<pb::CommentsR>>> {
    let res = state
        .feed
        .list_comments(pb::CommentList {
            post_id: query.post_id.unwrap_or_default(),
            limit: parse_or(query.limit.as_deref(), DEFAULT_LIMIT),
            offset: parse_or(query.offset.as_deref(), DEFAULT_OFFSET),
        })
        .await
        .map_err(backend_error)?;
    Ok(Json(CommentsEnvelope { comments: res }))
}

/// DELETE /comment/delete/{id}
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<CommentEnvelope<pb::Message>>> {
    let res = state
        .feed
        .delete_comment(pb::CommentId { id })
        .await
        .map_err(backend_error)?;
    Ok(Json(CommentEnvelope { comment: res }))
}

/// 댓글 라우터 생성.
pub fn comment_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(create_comment))
        .route("/update", put(update_comment))
        .route("/getBy/{id}", get(get_comment))
        .route("/list", get(list_comments))
        .route("/delete/{id}", delete(delete_comment))
}
