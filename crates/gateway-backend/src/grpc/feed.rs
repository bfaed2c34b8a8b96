//! 게시글/댓글/좋아요 백엔드 gRPC 클라이언트.

use async_trait::async_trait;

use super::channel::{ChannelSettings, UnaryClient};
use crate::error::BackendResult;
use crate::proto::post;
use crate::traits::FeedService;

mod path {
    pub const CREATE_POST: &str = "/post.PostService/CreatePost";
    pub const UPDATE_POST: &str = "/post.PostService/UpdatePost";
    pub const DELETE_POST: &str = "/post.PostService/DeletePost";
    pub const GET_POST: &str = "/post.PostService/GetPostByID";
    pub const LIST_POSTS: &str = "/post.PostService/ListPosts";
    pub const GET_POST_BY_COUNTRY: &str = "/post.PostService/GetPostByCountry";
    pub const ADD_IMAGE_TO_POST: &str = "/post.PostService/AddImageToPost";
    pub const REMOVE_IMAGE_FROM_POST: &str = "/post.PostService/RemoveImageFromPost";

    pub const CREATE_COMMENT: &str = "/post.CommentService/CreateComment";
    pub const UPDATE_COMMENT: &str = "/post.CommentService/UpdateComment";
    pub const DELETE_COMMENT: &str = "/post.CommentService/DeleteComment";
    pub const GET_COMMENT: &str = "/post.CommentService/GetCommentByID";
    pub const LIST_COMMENTS: &str = "/post.CommentService/ListComments";

    pub const ADD_LIKE_POST: &str = "/post.LikeService/AddLikePost";
    pub const DELETE_LIKE_POST: &str = "/post.LikeService/DeleteLikePost";
    pub const ADD_LIKE_COMMENT: &str = "/post.LikeService/AddLikeComment";
    pub const DELETE_LIKE_COMMENT: &str = "/post.LikeService/DeleteLikeComment";
    pub const GET_POST_LIKE_COUNT: &str = "/post.LikeService/GetPostLikeCount";
}

/// `PostService`, `CommentService`, `LikeService` 클라이언트.
///
/// 세 서비스는 같은 백엔드 프로세스에 있으므로 채널 하나를 공유합니다.
#[derive(Clone)]
pub struct GrpcFeedClient {
    client: UnaryClient,
}

impl GrpcFeedClient {
    /// 지연 연결 클라이언트를 생성합니다.
    pub fn connect_lazy(settings: &ChannelSettings) -> BackendResult<Self> {
        Ok(Self {
            client: UnaryClient::connect_lazy(settings)?,
        })
    }
}

#[async_trait]
impl FeedService for GrpcFeedClient {
    async fn create_post(&self, req: post::Post) -> BackendResult<post::PostResponse> {
        self.client.unary(path::CREATE_POST, req).await
    }

    async fn update_post(&self, req: post::UpdateAPost) -> BackendResult<post::PostResponse> {
        self.client.unary(path::UPDATE_POST, req).await
    }

    async fn delete_post(&self, req: post::PostId) -> BackendResult<post::Message> {
        self.client.unary(path::DELETE_POST, req).await
    }

    async fn get_post(&self, req: post::PostId) -> BackendResult<post::PostResponse> {
        self.client.unary(path::GET_POST, req).await
    }

    async fn list_posts(&self, req: post::PostList) -> BackendResult<post::PostListResponse> {
        self.client.unary(path::LIST_POSTS, req).await
    }

    async fn get_posts_by_country(
        &self,
        req: post::PostCountry,
    ) -> BackendResult<post::PostListResponse> {
        self.client.unary(path::GET_POST_BY_COUNTRY, req).await
    }

    async fn add_image_to_post(&self, req: post::ImageUrl) -> BackendResult<post::Message> {
        self.client.unary(path::ADD_IMAGE_TO_POST, req).await
    }

    async fn remove_image_from_post(&self, req: post::ImageUrl) -> BackendResult<post::Message> {
        self.client.unary(path::REMOVE_IMAGE_FROM_POST, req).await
    }

    async fn create_comment(
        &self,
        req: post::CommentPost,
    ) -> BackendResult<post::CommentResponse> {
        self.client.unary(path::CREATE_COMMENT, req).await
    }

    async fn update_comment(
        &self,
        req: post::UpdateAComment,
    ) -> BackendResult<post::CommentResponse> {
        self.client.unary(path::UPDATE_COMMENT, req).await
    }

    async fn delete_comment(&self, req: post::CommentId) -> BackendResult<post::Message> {
        self.client.unary(path::DELETE_COMMENT, req).await
    }

    async fn get_comment(&self, req: post::CommentId) -> BackendResult<post::CommentResponse> {
        self.client.unary(path::GET_COMMENT, req).await
    }

    async fn list_comments(&self, req: post::CommentList) -> BackendResult<post::CommentsR> {
        self.client.unary(path::LIST_COMMENTS, req).await
    }

    async fn add_like_post(&self, req: post::LikePost) -> BackendResult<post::LikeResponse> {
        self.client.unary(path::ADD_LIKE_POST, req).await
    }

    async fn delete_like_post(&self, req: post::LikePost) -> BackendResult<post::Message> {
        self.client.unary(path::DELETE_LIKE_POST, req).await
    }

    async fn add_like_comment(
        &self,
        req: post::LikeComment,
    ) -> BackendResult<post::LikeComResponse> {
        self.client.unary(path::ADD_LIKE_COMMENT, req).await
    }

    async fn delete_like_comment(&self, req: post::LikeComment) -> BackendResult<post::Message> {
        self.client.unary(path::DELETE_LIKE_COMMENT, req).await
    }

    async fn get_post_like_count(&self, req: post::PostId) -> BackendResult<post::LikeCount> {
        self.client.unary(path::GET_POST_LIKE_COUNT, req).await
    }

    fn name(&self) -> &str {
        self.client.target()
    }
}
