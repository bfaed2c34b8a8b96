//! 게시글 endpoint (`/post`).

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use gateway_backend::proto::post as pb;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::upload::{read_multipart, upload_to};
use super::user::parse_or;
use crate::auth::CurrentUser;
use crate::error::{backend_error, ApiResult, JsonBody, QueryParams};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 10;
const DEFAULT_OFFSET: i64 = 1;

/// `{"post": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEnvelope<T> {
    pub post: T,
}

/// `{"posts": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostsEnvelope<T> {
    pub posts: T,
}

/// 게시글 수정 본문. 작성자는 토큰의 사용자로 고정됩니다.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdatePostBody {
    pub id: String,
    pub country: String,
    pub location: String,
    pub title: String,
    pub content: String,
    pub hashtag: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPostsQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub country: Option<String>,
    pub hashtag: Option<String>,
}

impl ListPostsQuery {
    fn into_request(self) -> pb::PostList {
        pb::PostList {
            limit: parse_or(self.limit.as_deref(), DEFAULT_LIMIT),
            offset: parse_or(self.offset.as_deref(), DEFAULT_OFFSET),
            country: self.country.unwrap_or_default(),
            hashtag: self.hashtag.unwrap_or_default(),
        }
    }
}

/// 게시글 생성. `file`이 있으면 먼저 업로드해 `image_url`로 씁니다.
///
/// POST /post/create (multipart: title, content, country, description, hashtag, location, file?)
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<PostEnvelope<pb::PostResponse>>)> {
    let mut form = read_multipart(multipart).await?;

    let image_url = match form.file.take() {
        Some(file) => upload_to(&state, &state.buckets.post, file).await?,
        None => String::new(),
    };

    let created = state
        .feed
        .create_post(pb::Post {
            user_id,
            title: form.text("title"),
            content: form.text("content"),
            country: form.text("country"),
            description: form.text("description"),
            hashtag: form.text("hashtag"),
            location: form.text("location"),
            image_url,
        })
        .await
        .map_err(backend_error)?;

    info!(post_id = %created.id, user_id = %created.user_id, "Post created");
    Ok((StatusCode::CREATED, Json(PostEnvelope { post: created })))
}

/// PUT /post/update
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    JsonBody(body): JsonBody<UpdatePostBody>,
) -> ApiResult<Json<PostEnvelope<pb::PostResponse>>> {
    let updated = state
        .feed
        .update_post(pb::UpdateAPost {
            id: body.id,
            user_id,
            country: body.country,
            location: body.location,
            title: body.title,
            content: body.content,
            hashtag: body.hashtag,
            image_url: body.image_url,
        })
        .await
        .map_err(backend_error)?;
    Ok(Json(PostEnvelope { post: updated }))
}

/// DELETE /post/delete/{id}
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PostEnvelope<pb::Message>>> {
    let res = state
        .feed
        .delete_post(pb::PostId { id })
        .await
        .map_err(backend_error)?;
    Ok(Json(PostEnvelope { post: res }))
}

/// GET /post/getBy/{id}
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PostEnvelope<pb::PostResponse>>> {
    let res = state
        .feed
        .get_post(pb::PostId { id })
        .await
        .map_err(backend_error)?;
    Ok(Json(PostEnvelope { post: res }))
}

/// GET /post/list?limit=&offset=&country=&hashtag=
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<ListPostsQuery>,
) -> ApiResult<Json<PostsEnvelope<pb::PostListResponse>>> {
    let res = state
        .feed
        .list_posts(query.into_request())
        .await
        .map_err(backend_error)?;
    Ok(Json(PostsEnvelope { posts: res }))
}

/// PUT /post/add-image/{id} (multipart `file`)
pub async fn add_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<PostEnvelope<pb::Message>>> {
    let file = read_multipart(multipart).await?.require_file()?;
    let url = upload_to(&state, &state.buckets.post, file).await?;

    let res = state
        .feed
        .add_image_to_post(pb::ImageUrl { post_id: id, url })
        .await
        .map_err(backend_error)?;
    Ok(Json(PostEnvelope { post: res }))
}

/// DELETE /post/remove-image/{id}
pub async fn remove_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PostEnvelope<pb::Message>>> {
    let res = state
        .feed
        .remove_image_from_post(pb::ImageUrl {
            post_id: id,
            url: String::new(),
        })
        .await
        .map_err(backend_error)?;
    Ok(Json(PostEnvelope { post: res }))
}

/// GET /post/country/{country}
pub async fn posts_by_country(
    State(state): State<Arc<AppState>>,
    Path(country): Path<String>,
) -> ApiResult<Json<PostEnvelope<pb::PostListResponse>>> {
    let res = state
        .feed
        .get_posts_by_country(pb::PostCountry { country })
        .await
        .map_err(backend_error)?;
    Ok(Json(PostEnvelope { post: res }))
}

/// 게시글 라우터 생성.
pub fn post_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(create_post))
        .route("/update", put(update_post))
        .route("/delete/{id}", delete(delete_post))
        .route("/getBy/{id}", get(get_post))
        .route("/list", get(list_posts))
        .route("/add-image/{id}", put(add_image))
        .route("/remove-image/{id}", delete(remove_image))
        .route("/country/{country}", get(posts_by_country))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let req = ListPostsQuery::default().into_request();
        assert_eq!(req.limit, 10);
        assert_eq!(req.offset, 1);

        let req = ListPostsQuery {
            limit: Some("25".into()),
            offset: Some("x".into()),
            country: Some("KR".into()),
            hashtag: None,
        }
        .into_request();
        assert_eq!(req.limit, 25);
        assert_eq!(req.offset, 1);
        assert_eq!(req.country, "KR");
    }
}
