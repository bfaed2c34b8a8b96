//! 게이트웨이 뒤편의 협력 서비스.
//!
//! - [`IdentityService`] / [`FeedService`]: 사용자·게시글 백엔드 (gRPC)
//! - [`ObjectStorage`]: 이미지 업로드 (S3 호환)

pub mod error;
pub mod grpc;
pub mod proto;
pub mod storage;
pub mod traits;

pub use error::{BackendError, BackendResult, StorageError, StorageResult};
pub use grpc::{ChannelSettings, GrpcFeedClient, GrpcIdentityClient};
pub use storage::{ObjectStorage, S3Storage};
pub use traits::{FeedService, IdentityService};
